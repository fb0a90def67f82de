use std::{fs, path::Path};

use crate::{domain::ChatId, errors::Error, Result};

/// Load the initial frontier from a tab-separated file with an `id` column.
///
/// Ids are canonicalized on the way in, so a seed file holding raw
/// `-100...` ids still produces a consistent graph.
pub fn load(path: &Path) -> Result<Vec<ChatId>> {
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines();

    let header = lines.next().ok_or_else(|| Error::Seeds {
        path: path.to_path_buf(),
        reason: "file is empty".to_string(),
    })?;
    let id_col = header
        .split('\t')
        .position(|col| col.trim() == "id")
        .ok_or_else(|| Error::Seeds {
            path: path.to_path_buf(),
            reason: "header has no `id` column".to_string(),
        })?;

    let mut seeds = Vec::new();
    for (idx, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let field = line.split('\t').nth(id_col).ok_or_else(|| Error::Seeds {
            path: path.to_path_buf(),
            reason: format!("line {}: missing id field", idx + 2),
        })?;
        let raw = field.trim().parse::<i64>().map_err(|_| Error::Seeds {
            path: path.to_path_buf(),
            reason: format!("line {}: invalid id {:?}", idx + 2, field),
        })?;
        seeds.push(ChatId::canonical(raw));
    }
    Ok(seeds)
}
