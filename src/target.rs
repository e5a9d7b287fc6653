use tokio::process::Command;

use crate::SyncError;

const INSPECT_FORMAT: &str = "{{range.NetworkSettings.Networks}}{{.IPAddress}}{{end}}";

/// Reads the container's network IP from the local docker daemon. Returns
/// an empty string when the container is missing or has no address; the
/// caller treats that as "do not touch anything and exit".
pub async fn resolve_container_ip(container: &str) -> Result<String, SyncError> {
    let output = Command::new("docker")
        .args(["inspect", "-f", INSPECT_FORMAT, container])
        .output().await?;

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
