use std::path::{Path, PathBuf};

use common::DiscKind;

const DVD_DIR: &str = "VIDEO_TS";
const DVD_INDEX: &str = "VIDEO_TS.IFO";
const BLURAY_DIR: &str = "BDMV";
const BLURAY_INDEX: &str = "index.bdmv";

const EXCLUDED_DIRS: &[&str] = &["extras", ".actors", "extrafanarts"];
const SKIPPED_FILE_MARKERS: &[&str] = &["-trailer", "-sample"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirClass {
    DiscImage { disc: DiscKind, index_file: PathBuf },
    Ordinary,
}

/// DVD wins when both layouts are present.
pub fn classify(dir: &Path) -> DirClass {
    let dvd = dir.join(DVD_DIR).join(DVD_INDEX);
    if dvd.exists() {
        return DirClass::DiscImage {
            disc: DiscKind::Dvd,
            index_file: dvd,
        };
    }
    let bluray = dir.join(BLURAY_DIR).join(BLURAY_INDEX);
    if bluray.exists() {
        return DirClass::DiscImage {
            disc: DiscKind::BluRay,
            index_file: bluray,
        };
    }
    DirClass::Ordinary
}

pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS
        .iter()
        .any(|excluded| name.eq_ignore_ascii_case(excluded))
}

pub fn is_skipped_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    SKIPPED_FILE_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

pub fn disc_kind_of(file: &Path) -> Option<DiscKind> {
    let name = file.file_name()?.to_str()?;
    let parent = file.parent()?.file_name()?.to_str()?;
    if name.eq_ignore_ascii_case(DVD_INDEX) && parent.eq_ignore_ascii_case(DVD_DIR) {
        Some(DiscKind::Dvd)
    } else if name.eq_ignore_ascii_case(BLURAY_INDEX) && parent.eq_ignore_ascii_case(BLURAY_DIR) {
        Some(DiscKind::BluRay)
    } else {
        None
    }
}
