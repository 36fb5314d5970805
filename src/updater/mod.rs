use std::cmp::Ordering;

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

const RELEASES_URL: &str = "https://api.github.com/repos/flarialmc/launcher/releases/latest";

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    UpdateAvailable { latest_version: String, url: String },
}

/// Check the launcher's latest GitHub release against `current_version`.
///
/// # Errors
/// Fails when the releases endpoint is unreachable or returns an unexpected body.
pub async fn check_for_updates(client: &Client, current_version: &str) -> Result<UpdateStatus, String> {
    let response = client
        .get(RELEASES_URL)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .map_err(|err| format!("Failed to check for updates: {err}"))?;

    if !response.status().is_success() {
        return Err(format!("GitHub API returned status: {}", response.status()));
    }

    let release: ReleaseInfo = response
        .json()
        .await
        .map_err(|err| format!("Failed to parse release info: {err}"))?;
    debug!("updater: latest release {}", release.tag_name);
    Ok(status_for(release, current_version))
}

fn status_for(release: ReleaseInfo, current_version: &str) -> UpdateStatus {
    let latest = version_parts(&release.tag_name);
    let current = version_parts(current_version);
    if compare_parts(&latest, &current) == Ordering::Greater {
        info!("updater: {} is newer than {current_version}", release.tag_name);
        UpdateStatus::UpdateAvailable {
            latest_version: release.tag_name,
            url: release.html_url,
        }
    } else {
        UpdateStatus::UpToDate
    }
}

/// Numeric components of a tag such as `v2.1.0`; non-numeric parts are
/// skipped.
fn version_parts(version: &str) -> Vec<u32> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Component-wise comparison with missing trailing parts read as zero.
fn compare_parts(a: &[u32], b: &[u32]) -> Ordering {
    let len = a.len().max(b.len());
    let at = |parts: &[u32], i: usize| parts.get(i).copied().unwrap_or(0);
    (0..len)
        .map(|i| at(a, i).cmp(&at(b, i)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_into_numbers() {
        assert_eq!(version_parts("v0.1.5"), vec![0, 1, 5]);
        assert_eq!(version_parts("  v1.2.3  "), vec![1, 2, 3]);
        assert_eq!(version_parts("10.0"), vec![10, 0]);
        assert!(version_parts("nightly").is_empty());
    }

    #[test]
    fn missing_parts_compare_as_zero() {
        assert_eq!(compare_parts(&[0, 1], &[0, 1, 0]), Ordering::Equal);
        assert_eq!(compare_parts(&[1, 0, 0], &[0, 9, 9]), Ordering::Greater);
        assert_eq!(compare_parts(&[0, 1, 4], &[0, 1, 5]), Ordering::Less);
    }

    #[test]
    fn only_newer_releases_are_offered() {
        let release = |tag: &str| ReleaseInfo {
            tag_name: tag.into(),
            html_url: "https://github.com/flarialmc/launcher/releases".into(),
        };
        assert_eq!(status_for(release("v2.1.0"), "2.1.0"), UpdateStatus::UpToDate);
        assert_eq!(status_for(release("v2.0.9"), "2.1.0"), UpdateStatus::UpToDate);
        assert!(matches!(
            status_for(release("v2.2.0"), "2.1.0"),
            UpdateStatus::UpdateAvailable { latest_version, .. } if latest_version == "v2.2.0"
        ));
    }
}
