use std::fs;
use std::io;
use std::path::Path;

const TEE: &str = "├── ";
const LAST: &str = "└── ";
const BRANCH: &str = "│   ";
const SPACE: &str = "    ";

/// Render `root` as an indented tree, directories before files, each group
/// sorted by name. The root itself is not printed.
///
/// Only an unreadable `root` is an error; unreadable subdirectories are
/// rendered without children. Symlinks are listed but never followed.
pub fn render_tree(root: &Path) -> io::Result<String> {
    let mut out = String::new();
    walk(root, "", &mut out, true)?;
    Ok(out)
}

fn walk(dir: &Path, prefix: &str, out: &mut String, top: bool) -> io::Result<()> {
    let entries = match read_sorted(dir) {
        Ok(e) => e,
        Err(e) if top => return Err(e),
        Err(e) => {
            log::debug!("skipping {}: {}", dir.display(), e);
            return Ok(());
        }
    };

    let n = entries.len();
    for (i, (name, is_dir)) in entries.into_iter().enumerate() {
        let last = i + 1 == n;
        out.push_str(prefix);
        out.push_str(if last { LAST } else { TEE });
        out.push_str(&name);
        out.push('\n');
        if is_dir {
            let child = format!("{}{}", prefix, if last { SPACE } else { BRANCH });
            walk(&dir.join(&name), &child, out, false)?;
        }
    }
    Ok(())
}

fn read_sorted(dir: &Path) -> io::Result<Vec<(String, bool)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
    }
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dirs_first_then_files_with_connectors() {
        let td = tempdir().unwrap();
        let root = td.path();
        fs::create_dir_all(root.join("01_PROJECTS/2025")).unwrap();
        fs::create_dir_all(root.join("07_RESOURCES/Mockups")).unwrap();
        fs::write(root.join("07_RESOURCES/readme.txt"), "").unwrap();
        fs::write(root.join("a.txt"), "").unwrap();

        let want = "\
├── 01_PROJECTS
│   └── 2025
├── 07_RESOURCES
│   ├── Mockups
│   └── readme.txt
└── a.txt
";
        assert_eq!(render_tree(root).unwrap(), want);
    }

    #[test]
    fn last_directory_children_use_blank_indent() {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("only/inner")).unwrap();
        assert_eq!(render_tree(td.path()).unwrap(), "└── only\n    └── inner\n");
    }

    #[test]
    fn empty_and_missing_roots() {
        let td = tempdir().unwrap();
        assert_eq!(render_tree(td.path()).unwrap(), "");
        assert!(render_tree(&td.path().join("missing")).is_err());
    }
}
