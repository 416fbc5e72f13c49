use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::release::ReleaseInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    Unchanged,
}

/// Lowercase hex SHA-256 of the file at `path`, used to spot a download
/// that matches the installed binary byte for byte.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut digest = Sha256::new();
    io::copy(&mut fs::File::open(path)?, &mut digest)?;
    Ok(hex::encode(digest.finalize()))
}

/// Replace the binary at `target` with the release download.
///
/// Steps:
/// - Stream the asset into a temp file created next to `target` (same
///   filesystem), executable from creation.
/// - Reject an empty download before the live binary is touched.
/// - If the bytes hash identically to `target`, drop the temp file and
///   report [`ReplaceOutcome::Unchanged`].
/// - Otherwise rename the temp file over `target`.
///
/// The temp file is removed on every failure path before the rename.
///
/// # Errors
/// - [`Error::Download`] on transport failure or a non-success status.
/// - [`Error::Verification`] if the download is empty.
/// - [`Error::Io`] if `target` is gone or the rename fails.
pub fn apply_update(
    client: &Client,
    release: &ReleaseInfo,
    target: &Path,
) -> Result<ReplaceOutcome> {
    if !target.is_file() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} no longer exists", target.display()),
        )));
    }
    let dir = match target.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };

    let mut tmp = staging_file(dir)?;
    download_into(client, &release.download_url, &mut tmp)?;

    let size = tmp.as_file().metadata()?.len();
    if size == 0 {
        return Err(Error::Verification("downloaded binary is empty".into()));
    }
    log::debug!("staged {} bytes at {}", size, tmp.path().display());

    let old = sha256_file(target).unwrap_or_default();
    let new = sha256_file(tmp.path())?;
    if old == new {
        return Ok(ReplaceOutcome::Unchanged);
    }

    swap_into_place(tmp, target)?;
    log::info!("replaced {} with {}", target.display(), release.version);
    Ok(ReplaceOutcome::Replaced)
}

fn staging_file(dir: &Path) -> Result<NamedTempFile> {
    let mut b = tempfile::Builder::new();
    b.prefix(".sortpath-update-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        b.permissions(fs::Permissions::from_mode(0o755));
    }
    Ok(b.tempfile_in(dir)?)
}

fn download_into(client: &Client, url: &str, tmp: &mut NamedTempFile) -> Result<()> {
    let mut resp = client
        .get(url)
        .send()
        .map_err(|e| Error::Download(format!("{}: {}", url, e)))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Download(format!("{} returned HTTP {}", url, status)));
    }
    io::copy(&mut resp, tmp.as_file_mut())
        .map_err(|e| Error::Download(format!("{}: {}", url, e)))?;
    tmp.as_file().sync_all()?;
    Ok(())
}

#[cfg(not(windows))]
fn swap_into_place(tmp: NamedTempFile, target: &Path) -> Result<()> {
    tmp.persist(target).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// A running executable cannot be overwritten on Windows, but it can be
/// renamed; move it aside first and restore it if the swap fails.
#[cfg(windows)]
fn swap_into_place(tmp: NamedTempFile, target: &Path) -> Result<()> {
    let aside = aside_path(target);
    let _ = fs::remove_file(&aside);
    fs::rename(target, &aside)?;
    if let Err(e) = tmp.persist(target) {
        let _ = fs::rename(&aside, target);
        return Err(Error::Io(e.error));
    }
    Ok(())
}

/// `<name>.old` next to `target`, keeping any existing extension.
#[cfg_attr(not(windows), allow(dead_code))]
fn aside_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".old");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::tempdir;

    fn release(url: String) -> ReleaseInfo {
        ReleaseInfo {
            version: "1.2.0".into(),
            download_url: url,
            published_at: None,
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut v: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn empty_download_leaves_binary_and_no_temp() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/bin");
            then.status(200).body("");
        });
        let td = tempdir().unwrap();
        let target = td.path().join("sortpath");
        fs::write(&target, b"old-binary").unwrap();

        let err = apply_update(&Client::new(), &release(server.url("/bin")), &target).unwrap_err();

        assert!(matches!(err, Error::Verification(_)));
        assert_eq!(fs::read(&target).unwrap(), b"old-binary");
        assert_eq!(entries(td.path()), vec!["sortpath"]);
    }

    #[test]
    fn successful_download_replaces_target_exactly() {
        let payload = b"\x7fELF new sortpath build".to_vec();
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/bin");
            then.status(200).body(payload.clone());
        });
        let td = tempdir().unwrap();
        let target = td.path().join("sortpath");
        fs::write(&target, b"old-binary").unwrap();

        let out = apply_update(&Client::new(), &release(server.url("/bin")), &target).unwrap();

        m.assert();
        assert_eq!(out, ReplaceOutcome::Replaced);
        assert_eq!(fs::read(&target).unwrap(), payload);
        assert_eq!(entries(td.path()), vec!["sortpath"]);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&target).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn http_error_is_download_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/bin");
            then.status(404);
        });
        let td = tempdir().unwrap();
        let target = td.path().join("sortpath");
        fs::write(&target, b"old-binary").unwrap();

        let err = apply_update(&Client::new(), &release(server.url("/bin")), &target).unwrap_err();

        assert!(matches!(err, Error::Download(_)));
        assert_eq!(fs::read(&target).unwrap(), b"old-binary");
        assert_eq!(entries(td.path()), vec!["sortpath"]);
    }

    #[test]
    fn identical_bytes_are_unchanged() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/bin");
            then.status(200).body("same");
        });
        let td = tempdir().unwrap();
        let target = td.path().join("sortpath");
        fs::write(&target, b"same").unwrap();

        let out = apply_update(&Client::new(), &release(server.url("/bin")), &target).unwrap();

        assert_eq!(out, ReplaceOutcome::Unchanged);
        assert_eq!(entries(td.path()), vec!["sortpath"]);
    }

    #[test]
    fn aside_name_appends_old_to_full_file_name() {
        assert_eq!(
            aside_path(Path::new("/opt/tools/sortpath.exe")),
            PathBuf::from("/opt/tools/sortpath.exe.old")
        );
        assert_eq!(
            aside_path(Path::new("/usr/local/bin/sortpath")),
            PathBuf::from("/usr/local/bin/sortpath.old")
        );
    }

    #[test]
    fn sha256_matches_known_digest() {
        let td = tempdir().unwrap();
        let f = td.path().join("abc");
        fs::write(&f, b"abc").unwrap();
        assert_eq!(
            sha256_file(&f).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn missing_target_fails_before_download() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/bin");
            then.status(200).body("new");
        });
        let td = tempdir().unwrap();

        let err = apply_update(
            &Client::new(),
            &release(server.url("/bin")),
            &td.path().join("gone"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        m.assert_hits(0);
    }
}
