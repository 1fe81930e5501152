//! Live backend driving the `helm` CLI.
//!
//! Each backend call runs one `helm` command. Listing also runs one per
//! release to fetch its values, plus one `helm search repo` per distinct
//! chart. Values overlays are passed on stdin with `--values -` so they never
//! touch the disk.
//!
//! `helm list` only reports a `<chart>-<version>` label. Releases carry an
//! installable reference instead: the repository-qualified chart found by
//! `helm search repo`, pinned as `<repo>/<chart>@<version>`.

use reconcile::{
    Backend, BackendError, BackendResult, DeleteOptions, InstallOptions, StatusFilter,
    UpgradeOptions,
};
use snapshot::{Chart, Config, Release, Status};
use std::collections::HashMap;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::process::{Command, Output, Stdio};

/// Environment variable overriding the helm executable
pub const ENV_HELM_BIN: &str = "HELM_BULK_HELM_BIN";

const DEFAULT_HELM_BIN: &str = "helm";

/// Backend that executes real `helm` commands.
pub struct HelmBackend {
    /// Path to the helm executable
    helm_path: String,
}

impl HelmBackend {
    /// Create a backend using `$HELM_BULK_HELM_BIN`, or `helm` from `PATH`.
    pub fn new() -> Self {
        let helm_path =
            std::env::var(ENV_HELM_BIN).unwrap_or_else(|_| DEFAULT_HELM_BIN.to_string());
        Self::with_binary(helm_path)
    }

    pub fn with_binary(helm_path: impl Into<String>) -> Self {
        Self {
            helm_path: helm_path.into(),
        }
    }

    /// Run a helm command, feeding `stdin` if given, and return its output.
    fn run_helm(&self, args: &[String], stdin: Option<&str>) -> BackendResult<Output> {
        log::debug!("Running {} {}", self.helm_path, args.join(" "));

        let mut child = Command::new(&self.helm_path)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    BackendError::Unavailable {
                        message: format!("{} not found", self.helm_path),
                    }
                } else {
                    BackendError::CommandFailed {
                        message: format!("failed to execute helm: {e}"),
                        stderr: String::new(),
                    }
                }
            })?;

        if let Some(input) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            // A broken pipe means helm exited early; its stderr says why
            if let Err(e) = pipe.write_all(input.as_bytes())
                && e.kind() != ErrorKind::BrokenPipe
            {
                return Err(BackendError::CommandFailed {
                    message: format!("failed to pass values to helm: {e}"),
                    stderr: String::new(),
                });
            }
        }

        child
            .wait_with_output()
            .map_err(|e| BackendError::CommandFailed {
                message: format!("failed to wait for helm: {e}"),
                stderr: String::new(),
            })
    }

    /// Run a helm command and check for success, returning stdout.
    fn run_helm_checked(
        &self,
        args: &[String],
        stdin: Option<&str>,
        release: Option<&str>,
    ) -> BackendResult<String> {
        let output = self.run_helm(args, stdin)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let command = format!("helm {}", args.first().map_or("", String::as_str));
            return Err(BackendError::from_command_output(&command, &stderr, release));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// User-supplied values of a deployed release, as YAML
    fn get_values(&self, name: &str, namespace: &str) -> BackendResult<String> {
        let out = self.run_helm_checked(&get_values_args(name, namespace), None, Some(name))?;
        Ok(normalize_values(&out))
    }

    /// Installable reference for a `helm list` chart label
    ///
    /// Falls back to the bare chart name when no configured repository has
    /// it; installing such a release needs its repository added first.
    fn resolve_chart(&self, label: &str) -> ChartRef {
        let (chart, version) = split_chart_label(label);
        let found = self
            .run_helm_checked(&search_args(chart, version), None, None)
            .map(|out| parse_search(&out, chart));

        let qualified = match found {
            Ok(Some(qualified)) => qualified,
            Ok(None) => {
                log::warn!("Chart {chart} is not in any configured repository");
                chart.to_string()
            }
            Err(e) => {
                log::warn!("Could not look up chart {chart}: {e}");
                chart.to_string()
            }
        };
        ChartRef {
            chart: qualified,
            version: version.map(ToString::to_string),
        }
    }
}

impl Default for HelmBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for HelmBackend {
    fn list(&self, filter: StatusFilter) -> BackendResult<Vec<Release>> {
        let out = self.run_helm_checked(&list_args(filter), None, None)?;
        let listed = parse_list(&out)?;
        log::debug!("helm list returned {} releases", listed.len());

        let mut charts: HashMap<String, String> = HashMap::new();
        listed
            .into_iter()
            .map(|entry| {
                let values = self.get_values(&entry.name, &entry.namespace)?;
                let reference = charts
                    .entry(entry.chart.clone())
                    .or_insert_with(|| self.resolve_chart(&entry.chart).to_string());
                Ok(Release::new(entry.name)
                    .with_namespace(entry.namespace)
                    .with_chart(Chart::from_reference(reference))
                    .with_config(Config::from_values(&values))
                    .with_status(entry.status)
                    .with_version(entry.revision))
            })
            .collect()
    }

    fn install(
        &self,
        chart: &Chart,
        namespace: &str,
        options: &InstallOptions,
    ) -> BackendResult<Status> {
        let name = options.release_name.as_str();
        let reference = chart_ref(name, chart)?;
        let values = values_input(name, &options.values_override)?;

        let args = install_args(name, &reference, namespace, options, values.is_some());
        let out = self.run_helm_checked(&args, values.as_deref(), Some(name))?;
        Ok(parse_release_status(&out))
    }

    fn upgrade(
        &self,
        name: &str,
        chart: &Chart,
        options: &UpgradeOptions,
    ) -> BackendResult<Status> {
        let reference = chart_ref(name, chart)?;
        let values = values_input(name, &options.values_override)?;

        let args = upgrade_args(name, &reference, options, values.is_some());
        let out = self.run_helm_checked(&args, values.as_deref(), Some(name))?;
        Ok(parse_release_status(&out))
    }

    fn delete(&self, name: &str, options: &DeleteOptions) -> BackendResult<()> {
        self.run_helm_checked(&uninstall_args(name, options), None, Some(name))?;
        Ok(())
    }

    fn health_check(&self) -> BackendResult<()> {
        let version = self.run_helm_checked(&to_args(&["version", "--short"]), None, None)?;
        log::info!("Using helm {}", version.trim());
        Ok(())
    }
}

// ============================================================================
// Command lines
// ============================================================================

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(ToString::to_string).collect()
}

fn push_namespace(args: &mut Vec<String>, namespace: &str) {
    if !namespace.is_empty() {
        args.extend(to_args(&["--namespace", namespace]));
    }
}

fn push_version(args: &mut Vec<String>, version: Option<&str>) {
    if let Some(version) = version {
        args.extend(to_args(&["--version", version]));
    }
}

fn list_args(filter: StatusFilter) -> Vec<String> {
    let status = match filter {
        StatusFilter::Deployed => "--deployed",
        StatusFilter::All => "--all",
    };
    // helm caps the answer at 256 releases unless told otherwise; 0 lifts it
    to_args(&[
        "list",
        "--all-namespaces",
        status,
        "--max",
        "0",
        "--output",
        "json",
    ])
}

fn search_args(chart: &str, version: Option<&str>) -> Vec<String> {
    let mut args = to_args(&["search", "repo", chart]);
    push_version(&mut args, version);
    args.extend(to_args(&["--output", "json"]));
    args
}

fn get_values_args(name: &str, namespace: &str) -> Vec<String> {
    let mut args = to_args(&["get", "values", name, "--output", "yaml"]);
    push_namespace(&mut args, namespace);
    args
}

fn install_args(
    name: &str,
    chart: &ChartRef,
    namespace: &str,
    options: &InstallOptions,
    with_values: bool,
) -> Vec<String> {
    let mut args = to_args(&["install", name, &chart.chart, "--output", "json"]);
    push_namespace(&mut args, namespace);
    push_version(&mut args, chart.version.as_deref());
    if with_values {
        args.extend(to_args(&["--values", "-"]));
    }
    if options.reuse_name {
        args.push("--replace".to_string());
    }
    if options.disable_hooks {
        args.push("--no-hooks".to_string());
    }
    args
}

fn upgrade_args(
    name: &str,
    chart: &ChartRef,
    options: &UpgradeOptions,
    with_values: bool,
) -> Vec<String> {
    let mut args = to_args(&["upgrade", name, &chart.chart, "--output", "json"]);
    push_namespace(&mut args, &options.namespace);
    push_version(&mut args, chart.version.as_deref());
    if with_values {
        args.extend(to_args(&["--values", "-"]));
    }
    if options.reuse_values {
        args.push("--reuse-values".to_string());
    }
    if options.force {
        args.push("--force".to_string());
    }
    if options.disable_hooks {
        args.push("--no-hooks".to_string());
    }
    args
}

fn uninstall_args(name: &str, options: &DeleteOptions) -> Vec<String> {
    let mut args = to_args(&["uninstall", name]);
    push_namespace(&mut args, &options.namespace);
    if !options.purge {
        args.push("--keep-history".to_string());
    }
    args
}

// ============================================================================
// Chart references
// ============================================================================

/// A chart helm can install, optionally pinned to a version
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChartRef {
    /// Repository-qualified name, path or URL
    chart: String,
    version: Option<String>,
}

impl ChartRef {
    /// Parse a stored reference, `<chart>` or `<chart>@<version>`
    fn parse(reference: &str) -> Self {
        match reference.rsplit_once('@') {
            Some((chart, version)) if !chart.is_empty() && is_version(version) => Self {
                chart: chart.to_string(),
                version: Some(version.to_string()),
            },
            _ => Self {
                chart: reference.to_string(),
                version: None,
            },
        }
    }
}

impl fmt::Display for ChartRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{version}", self.chart),
            None => f.write_str(&self.chart),
        }
    }
}

/// The chart reference carried by a release
fn chart_ref(name: &str, chart: &Chart) -> BackendResult<ChartRef> {
    chart.reference().map(ChartRef::parse).ok_or_else(|| {
        BackendError::Other(format!(
            "release {name} carries an embedded chart, not a chart reference helm can install"
        ))
    })
}

/// Split a `helm list` chart label, `<name>-<version>`, at the first dash
/// that starts a version
fn split_chart_label(label: &str) -> (&str, Option<&str>) {
    label
        .match_indices('-')
        .map(|(i, _)| (&label[..i], &label[i + 1..]))
        .find(|(name, version)| !name.is_empty() && is_version(version))
        .map_or((label, None), |(name, version)| (name, Some(version)))
}

/// Whether `s` looks like a chart version (`1.2.3`, `v0.4`, `1.0.0-rc.1`)
fn is_version(s: &str) -> bool {
    let s = s.strip_prefix('v').unwrap_or(s);
    let core = s.split(['-', '+']).next().unwrap_or_default();
    core.contains('.')
        && core
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

/// Values document to pass on stdin, if there is one
fn values_input(name: &str, config: &Config) -> BackendResult<Option<String>> {
    if config.is_empty() {
        return Ok(None);
    }
    let values = config
        .values()
        .map_err(|e| BackendError::Other(format!("values of release {name}: {e}")))?;
    Ok((!values.trim().is_empty()).then_some(values))
}

// ============================================================================
// Output parsing
// ============================================================================

/// One row of `helm list --output json`
#[derive(Debug, PartialEq, Eq)]
struct ListedRelease {
    name: String,
    namespace: String,
    chart: String,
    status: Status,
    revision: i32,
}

fn parse_list(json: &str) -> BackendResult<Vec<ListedRelease>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| BackendError::Other(format!("unexpected helm list output: {e}")))?;
    let Some(rows) = value.as_array() else {
        return Err(BackendError::Other(
            "unexpected helm list output: not a JSON array".to_string(),
        ));
    };

    rows.iter()
        .map(|row| {
            let name = row["name"].as_str().ok_or_else(|| {
                BackendError::Other("helm list row without a name".to_string())
            })?;
            // helm prints the revision as a string; accept a number too
            let revision = row["revision"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .or_else(|| row["revision"].as_i64().and_then(|n| i32::try_from(n).ok()))
                .unwrap_or_default();

            Ok(ListedRelease {
                name: name.to_string(),
                namespace: row["namespace"].as_str().unwrap_or_default().to_string(),
                chart: row["chart"].as_str().unwrap_or_default().to_string(),
                status: parse_status(row["status"].as_str().unwrap_or_default()),
                revision,
            })
        })
        .collect()
}

/// Repository-qualified name of `chart` in `helm search repo --output json`
fn parse_search(json: &str, chart: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    value
        .as_array()?
        .iter()
        .filter_map(|row| row["name"].as_str())
        .find(|name| name.rsplit('/').next() == Some(chart))
        .map(ToString::to_string)
}

/// Status of the release object printed by install/upgrade `--output json`
fn parse_release_status(json: &str) -> Status {
    serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|v| v["info"]["status"].as_str().map(parse_status))
        .unwrap_or_else(|| {
            log::debug!("No release status in helm output");
            Status::Unknown
        })
}

fn parse_status(status: &str) -> Status {
    match status {
        "deployed" => Status::Deployed,
        "uninstalled" => Status::Deleted,
        "superseded" => Status::Superseded,
        "failed" => Status::Failed,
        "uninstalling" => Status::Deleting,
        "pending-install" => Status::PendingInstall,
        "pending-upgrade" => Status::PendingUpgrade,
        "pending-rollback" => Status::PendingRollback,
        _ => Status::Unknown,
    }
}

/// `helm get values` prints `null` for a release without user values
fn normalize_values(out: &str) -> String {
    let trimmed = out.trim();
    if trimmed.is_empty() || trimmed == "null" {
        String::new()
    } else {
        out.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(args: &[String]) -> Vec<&str> {
        args.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_list_args() {
        assert_eq!(
            strs(&list_args(StatusFilter::Deployed)),
            [
                "list",
                "--all-namespaces",
                "--deployed",
                "--max",
                "0",
                "--output",
                "json"
            ]
        );
        assert!(list_args(StatusFilter::All).contains(&"--all".to_string()));
    }

    #[test]
    fn test_install_args_for_restore() {
        let release = Release::new("api").with_namespace("apps");
        let options = InstallOptions::restore(&release);
        assert_eq!(
            strs(&install_args(
                "api",
                &ChartRef::parse("charts/api"),
                "apps",
                &options,
                true
            )),
            [
                "install",
                "api",
                "charts/api",
                "--output",
                "json",
                "--namespace",
                "apps",
                "--values",
                "-",
                "--replace",
                "--no-hooks"
            ]
        );
    }

    #[test]
    fn test_upgrade_args_for_restore() {
        let release = Release::new("api").with_namespace("apps");
        let options = UpgradeOptions::restore(&release);
        let chart = ChartRef::parse("bitnami/api@1.4.0");
        let args = upgrade_args("api", &chart, &options, false);
        assert_eq!(
            strs(&args),
            [
                "upgrade",
                "api",
                "bitnami/api",
                "--output",
                "json",
                "--namespace",
                "apps",
                "--version",
                "1.4.0",
                "--reuse-values",
                "--force",
                "--no-hooks"
            ]
        );
    }

    #[test]
    fn test_uninstall_args() {
        let release = Release::new("api").with_namespace("apps");
        assert_eq!(
            strs(&uninstall_args("api", &DeleteOptions::purge(&release))),
            ["uninstall", "api", "--namespace", "apps"]
        );
        assert_eq!(
            strs(&uninstall_args("api", &DeleteOptions::default())),
            ["uninstall", "api", "--keep-history"]
        );
    }

    #[test]
    fn test_parse_list() {
        let json = r#"[
            {"name":"ingress","namespace":"kube-system","revision":"3","updated":"2024-01-01",
             "status":"deployed","chart":"ingress-nginx-4.7.1","app_version":"1.8.1"},
            {"name":"api","namespace":"apps","revision":12,"status":"failed","chart":"api-0.1.0"}
        ]"#;
        let listed = parse_list(json).unwrap();
        assert_eq!(
            listed[0],
            ListedRelease {
                name: "ingress".into(),
                namespace: "kube-system".into(),
                chart: "ingress-nginx-4.7.1".into(),
                status: Status::Deployed,
                revision: 3,
            }
        );
        assert_eq!(listed[1].revision, 12);
        assert_eq!(listed[1].status, Status::Failed);
    }

    #[test]
    fn test_parse_list_empty_and_invalid() {
        assert!(parse_list("[]").unwrap().is_empty());
        assert!(parse_list("\n").unwrap().is_empty());
        assert!(parse_list("{\"oops\": 1}").is_err());
        assert!(parse_list("[{\"namespace\": \"x\"}]").is_err());
    }

    #[test]
    fn test_parse_release_status() {
        let json = r#"{"name":"api","info":{"status":"deployed","notes":""},"version":1}"#;
        assert_eq!(parse_release_status(json), Status::Deployed);
        assert_eq!(parse_release_status("not json"), Status::Unknown);
    }

    #[test]
    fn test_parse_status_names() {
        assert_eq!(parse_status("pending-upgrade"), Status::PendingUpgrade);
        assert_eq!(parse_status("uninstalled"), Status::Deleted);
        assert_eq!(parse_status("something-new"), Status::Unknown);
    }

    #[test]
    fn test_normalize_values() {
        assert_eq!(normalize_values("null\n"), "");
        assert_eq!(normalize_values("replicaCount: 2\n"), "replicaCount: 2\n");
    }

    #[test]
    fn test_values_input() {
        assert_eq!(values_input("api", &Config::default()).unwrap(), None);
        assert_eq!(
            values_input("api", &Config::from_values("a: 1\n")).unwrap(),
            Some("a: 1\n".to_string())
        );
        assert!(values_input("api", &Config::from_bytes(vec![0x0a, 0x20])).is_err());
    }

    #[test]
    fn test_embedded_chart_rejected() {
        let chart = Chart::from_bytes(vec![0x0a, 0x05, 0x01]);
        assert!(chart_ref("api", &chart).is_err());
        let chart = Chart::from_reference("charts/api");
        assert_eq!(
            chart_ref("api", &chart).unwrap(),
            ChartRef {
                chart: "charts/api".into(),
                version: None,
            }
        );
    }

    #[test]
    fn test_split_chart_label() {
        assert_eq!(
            split_chart_label("ingress-nginx-4.7.1"),
            ("ingress-nginx", Some("4.7.1"))
        );
        assert_eq!(
            split_chart_label("my-app-1.0.0-rc.1"),
            ("my-app", Some("1.0.0-rc.1"))
        );
        assert_eq!(
            split_chart_label("k8s-2-agent-v0.3.0"),
            ("k8s-2-agent", Some("v0.3.0"))
        );
        assert_eq!(split_chart_label("local"), ("local", None));
    }

    #[test]
    fn test_chart_ref_parse_and_display() {
        let pinned = ChartRef::parse("ingress-nginx/ingress-nginx@4.7.1");
        assert_eq!(pinned.chart, "ingress-nginx/ingress-nginx");
        assert_eq!(pinned.version.as_deref(), Some("4.7.1"));
        assert_eq!(pinned.to_string(), "ingress-nginx/ingress-nginx@4.7.1");

        // A digest is part of the chart, not a version
        let digest = ChartRef::parse("oci://registry.local/api@sha256:abc");
        assert_eq!(digest.chart, "oci://registry.local/api@sha256:abc");
        assert_eq!(digest.version, None);
    }

    #[test]
    fn test_parse_search() {
        let json = r#"[
            {"name":"other/ingress-nginx-extras","version":"4.7.1"},
            {"name":"ingress-nginx/ingress-nginx","version":"4.7.1","app_version":"1.8.1"}
        ]"#;
        assert_eq!(
            parse_search(json, "ingress-nginx").as_deref(),
            Some("ingress-nginx/ingress-nginx")
        );
        assert_eq!(parse_search("[]", "ingress-nginx"), None);
        assert_eq!(parse_search("not json", "ingress-nginx"), None);
    }

    #[test]
    fn test_search_args() {
        assert_eq!(
            strs(&search_args("ingress-nginx", Some("4.7.1"))),
            [
                "search",
                "repo",
                "ingress-nginx",
                "--version",
                "4.7.1",
                "--output",
                "json"
            ]
        );
    }

    #[cfg(unix)]
    const LISTED: &str = r#"[{"name":"ingress","namespace":"kube-system","revision":"3",
        "status":"deployed","chart":"ingress-nginx-4.7.1","app_version":"1.8.1"}]"#;

    #[cfg(unix)]
    const INSTALLED: &str = r#"{"name":"ingress","info":{"status":"deployed"}}"#;

    /// Write an executable stand-in for `helm` that answers like helm 3 and
    /// appends every command line to `helm.log`
    #[cfg(unix)]
    fn scripted_helm(dir: &std::path::Path, search_hit: bool) -> HelmBackend {
        use std::os::unix::fs::PermissionsExt;

        let search = if search_hit {
            r#"printf '%s\n' '[{"name":"ingress-nginx/ingress-nginx","version":"4.7.1"}]'"#
        } else {
            "echo 'Error: no repositories configured' >&2; exit 1"
        };
        let script = format!(
            r#"#!/bin/sh
echo "$*" >> '{log}'
case "$1" in
  list) printf '%s\n' '{LISTED}' ;;
  get) printf 'controller:\n  replicaCount: 2\n' ;;
  search) {search} ;;
  install|upgrade) cat > /dev/null; printf '%s\n' '{INSTALLED}' ;;
  *) echo "unexpected command $1" >&2; exit 1 ;;
esac
"#,
            log = dir.join("helm.log").display(),
        );

        let path = dir.join("helm");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        HelmBackend::with_binary(path.to_string_lossy())
    }

    #[cfg(unix)]
    fn last_command(dir: &std::path::Path) -> String {
        let log = std::fs::read_to_string(dir.join("helm.log")).unwrap();
        log.lines().last().unwrap().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn test_listed_release_reinstalls_from_its_repository() {
        let dir = tempfile::TempDir::new().unwrap();
        let helm = scripted_helm(dir.path(), true);

        let releases = helm.list_deployed().unwrap();
        assert_eq!(releases.len(), 1);
        let release = &releases[0];
        assert_eq!(
            release.chart.reference(),
            Some("ingress-nginx/ingress-nginx@4.7.1")
        );
        assert_eq!(release.config.values().unwrap(), "controller:\n  replicaCount: 2\n");

        let status = helm
            .install(
                &release.chart,
                &release.namespace,
                &InstallOptions::restore(release),
            )
            .unwrap();
        assert_eq!(status, Status::Deployed);
        assert_eq!(
            last_command(dir.path()),
            "install ingress ingress-nginx/ingress-nginx --output json --namespace kube-system \
             --version 4.7.1 --values - --replace --no-hooks"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unresolved_chart_keeps_name_and_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let helm = scripted_helm(dir.path(), false);

        let releases = helm.list_deployed().unwrap();
        assert_eq!(releases[0].chart.reference(), Some("ingress-nginx@4.7.1"));

        helm.upgrade(
            "ingress",
            &releases[0].chart,
            &UpgradeOptions::restore(&releases[0]),
        )
        .unwrap();
        let expected = "upgrade ingress ingress-nginx --output json --namespace kube-system \
                        --version 4.7.1";
        assert!(last_command(dir.path()).starts_with(expected));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let backend = HelmBackend::with_binary("/nonexistent/helm-bulk-test/helm");
        assert!(matches!(
            backend.health_check(),
            Err(BackendError::Unavailable { .. })
        ));
    }
}
