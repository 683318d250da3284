use std::path::Path;

/// One address per line. Lines are trimmed and blank lines skipped, the
/// first address is the start of the round trip.
pub fn read_addresses(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let content = std::fs::read_to_string(path)?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
