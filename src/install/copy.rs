use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
pub fn make_executable(p: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perm = fs::metadata(p)?.permissions();
    perm.set_mode(0o755);
    fs::set_permissions(p, perm)
}

#[cfg(not(unix))]
pub fn make_executable(_p: &Path) -> io::Result<()> {
    Ok(())
}

/// Whether `a` and `b` name the same existing file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Stream `src` into `dst`, creating parent directories, and mark the
/// result executable.
///
/// A destination that was created but not fully written is removed again.
pub fn copy_binary(src: &Path, dst: &Path) -> io::Result<()> {
    let mut input = fs::File::open(src)?;
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = fs::File::create(dst)?;

    let res = io::copy(&mut input, &mut out)
        .and_then(|_| out.sync_all())
        .and_then(|_| make_executable(dst));
    if res.is_err() {
        drop(out);
        let _ = fs::remove_file(dst);
    }
    res
}
