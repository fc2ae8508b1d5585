//! Поиск резервных копий, которые TNMR сохраняет во время накопления.
//!
//! Копия лежит рядом с основным файлом и называется так же, но с
//! суффиксом `_N` перед расширением. Имена вида `*.tnt_N.tnt` считаются
//! копиями всегда. Имя `*_N.tnt` считается копией, только если рядом есть
//! основной файл, он не меньше копии и не старше её.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info};

use crate::{
    config::BackupAction,
    error::{CliError, CliResult},
};

const TNT_EXT: &str = ".tnt";

/// Результат проверки одного имени файла.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Безусловная копия (`*.tnt_N.tnt`)
    Backup,
    /// Копия, если есть основной файл с указанным именем
    NeedsBase(String),
}

/// Отрезает `_<цифры>` с конца `stem`.
fn strip_numeric_suffix(stem: &str) -> Option<&str> {
    let (head, digits) = stem.rsplit_once('_')?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(head)
    } else {
        None
    }
}

/// Классифицирует имя файла; `None` - не похоже на резервную копию.
pub fn classify_name(name: &str) -> Option<Candidate> {
    let stem = name.strip_suffix(TNT_EXT)?;
    let head = strip_numeric_suffix(stem)?;

    if head.ends_with(TNT_EXT) {
        Some(Candidate::Backup)
    } else {
        Some(Candidate::NeedsBase(format!("{head}{TNT_EXT}")))
    }
}

/// Рекурсивный поиск резервных копий под `root`.
///
/// Причины, по которым похожий файл оставлен, пишутся в лог.
pub fn find_backup_files(root: &Path) -> CliResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(root, &mut found)?;
    Ok(found)
}

fn walk(
    dir: &Path,
    found: &mut Vec<PathBuf>,
) -> CliResult<()> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else if file_type.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();
    subdirs.sort();

    let names: HashSet<&str> = files.iter().map(String::as_str).collect();

    for name in &files {
        let Some(candidate) = classify_name(name) else {
            continue;
        };

        let is_backup = match candidate {
            Candidate::Backup => true,
            Candidate::NeedsBase(base) => check_against_base(dir, name, &base, &names)?,
        };

        if is_backup {
            debug!("backup file {}", dir.join(name).display());
            found.push(dir.join(name));
        }
    }

    for sub in subdirs {
        walk(&sub, found)?;
    }

    Ok(())
}

fn check_against_base(
    dir: &Path,
    name: &str,
    base: &str,
    names: &HashSet<&str>,
) -> CliResult<bool> {
    if !names.contains(base) {
        info!("{name} does not have a matching base file {base}, keeping");
        return Ok(false);
    }

    let mine = fs::metadata(dir.join(name))?;
    let theirs = fs::metadata(dir.join(base))?;

    if mine.len() > theirs.len() {
        info!("{name} is bigger than {base}, keeping");
        return Ok(false);
    }

    if mine.modified()? > theirs.modified()? {
        info!("{name} is newer than {base}, keeping");
        return Ok(false);
    }

    Ok(true)
}

/// Выполняет действие над найденной копией. Вывод путей идёт в `out`.
pub fn apply_action<W: std::io::Write>(
    action: BackupAction,
    path: &Path,
    out: &mut W,
) -> CliResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| CliError::InvalidArgument(format!("{} has no file name", path.display())))?;

    match action {
        BackupAction::Print => writeln!(out, "{}", path.display())?,
        BackupAction::Basename => writeln!(out, "{}", name.to_string_lossy())?,
        BackupAction::Delete => fs::remove_file(path)?,
        BackupAction::GitRm => run_vcs_rm("git", dir, name)?,
        BackupAction::SvnRm => run_vcs_rm("svn", dir, name)?,
    }

    Ok(())
}

fn run_vcs_rm(
    program: &str,
    dir: &Path,
    name: &std::ffi::OsStr,
) -> CliResult<()> {
    let status = Command::new(program)
        .arg("rm")
        .arg(name)
        .current_dir(dir)
        .status()?;

    if !status.success() {
        return Err(CliError::Command {
            command: format!("{program} rm {}", name.to_string_lossy()),
            status: status.to_string(),
        });
    }

    Ok(())
}
