use crate::{DRIVER_BINARY_PREFIX, Error, protocol};
use modelgen_schema::node::Schema;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use std::{env, fs, thread};
use tracing::debug;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

///
/// ResolvedDriver
///
/// A driver identifier pinned to a concrete executable. An identifier
/// containing a path separator is taken as an explicit path; a bare name is
/// searched on PATH under the conventional binary prefix.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedDriver {
    pub name: String,
    pub path: PathBuf,
}

impl ResolvedDriver {
    pub fn resolve(identifier: &str) -> Result<Self, Error> {
        if identifier.contains(std::path::MAIN_SEPARATOR) {
            return Self::resolve_explicit(Path::new(identifier));
        }

        let binary = format!("{DRIVER_BINARY_PREFIX}{identifier}");
        for dir in env::split_paths(&env::var_os("PATH").unwrap_or_default()) {
            let candidate = dir.join(&binary);
            if is_executable(&candidate) {
                debug!(driver = identifier, path = %candidate.display(), "resolved driver");
                return Ok(Self {
                    name: identifier.to_string(),
                    path: candidate,
                });
            }
        }

        Err(Error::NotFound {
            name: identifier.to_string(),
        })
    }

    fn resolve_explicit(path: &Path) -> Result<Self, Error> {
        if !path.is_file() {
            return Err(Error::PathMissing {
                path: path.to_path_buf(),
            });
        }

        let path = fs::canonicalize(path).map_err(|_| Error::PathMissing {
            path: path.to_path_buf(),
        })?;

        // strip the conventional prefix so diagnostics use the short name
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.trim_start_matches(DRIVER_BINARY_PREFIX).to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { name, path })
    }
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.is_file()
            && fs::metadata(path).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

///
/// DriverClient
///
/// One blocking introspection exchange per generation run: write the request
/// document to the child's stdin, close it, read the response from stdout.
/// No timeout is imposed unless the caller asks for one; introspecting a
/// large catalog may legitimately take a while.
///

#[derive(Debug)]
pub struct DriverClient {
    driver: ResolvedDriver,
    timeout: Option<Duration>,
}

impl DriverClient {
    #[must_use]
    pub const fn new(driver: ResolvedDriver) -> Self {
        Self {
            driver,
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn driver_name(&self) -> &str {
        &self.driver.name
    }

    /// Run the introspection handshake and return the raw, not yet finalized
    /// schema model.
    pub fn introspect(&self, request: &protocol::IntrospectRequest) -> Result<Schema, Error> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| Error::protocol(format!("unencodable request: {e}")))?;

        debug!(driver = %self.driver.name, "launching driver subprocess");
        let mut child = Command::new(&self.driver.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                name: self.driver.name.clone(),
                source,
            })?;

        // Hand the request over and close stdin so the driver sees EOF.
        let mut stdin = child.stdin.take().expect("child stdin was piped");
        stdin.write_all(&payload).map_err(|source| Error::Spawn {
            name: self.driver.name.clone(),
            source,
        })?;
        drop(stdin);

        // Drain both pipes off-thread; a full pipe would deadlock the child.
        let stdout_pipe = child.stdout.take().expect("child stdout was piped");
        let stderr_pipe = child.stderr.take().expect("child stderr was piped");
        let stdout_reader = thread::spawn(move || read_all(stdout_pipe));
        let stderr_reader = thread::spawn(move || read_all(stderr_pipe));

        let status = self.wait(&mut child)?;

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(Error::Execution {
                name: self.driver.name.clone(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        protocol::parse_response(&stdout)
    }

    /// Wait for exit, polling so an armed timeout can kill a wedged driver.
    fn wait(&self, child: &mut Child) -> Result<std::process::ExitStatus, Error> {
        let deadline = self.timeout.map(|t| (Instant::now() + t, t));

        loop {
            if let Some(status) = child.try_wait().map_err(|source| Error::Spawn {
                name: self.driver.name.clone(),
                source,
            })? {
                return Ok(status);
            }

            if let Some((deadline, timeout)) = deadline {
                if Instant::now() >= deadline {
                    child.kill().ok();
                    child.wait().ok();
                    return Err(Error::Timeout {
                        name: self.driver.name.clone(),
                        seconds: timeout.as_secs(),
                    });
                }
            }

            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }
}

fn read_all(mut pipe: impl Read) -> Vec<u8> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).ok();
    buf
}

#[cfg(test)]
mod tests {
    use super::{DriverClient, ResolvedDriver};
    use crate::{Error, PROTOCOL_VERSION, options::ConnectionParams, protocol::IntrospectRequest};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn request() -> IntrospectRequest {
        IntrospectRequest {
            version: PROTOCOL_VERSION,
            connection: ConnectionParams::default(),
            whitelist: vec![],
            blacklist: vec![],
            options: BTreeMap::new(),
        }
    }

    #[cfg(unix)]
    fn stub_driver(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("modelgen-driver-stub");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("stub script written");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("stub script marked executable");

        path
    }

    #[test]
    fn unknown_bare_name_fails_with_not_found() {
        let err = ResolvedDriver::resolve("definitely-not-installed")
            .expect_err("unresolvable name must fail");

        assert!(matches!(err, Error::NotFound { name } if name == "definitely-not-installed"));
    }

    #[test]
    fn missing_explicit_path_fails_with_path_missing() {
        let err = ResolvedDriver::resolve("/no/such/modelgen-driver-x")
            .expect_err("missing path must fail");

        assert!(matches!(err, Error::PathMissing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn explicit_path_strips_binary_prefix_for_the_short_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = stub_driver(dir.path(), "exit 0");

        let resolved =
            ResolvedDriver::resolve(path.to_str().unwrap()).expect("existing path must resolve");
        assert_eq!(resolved.name, "stub");
    }

    #[cfg(unix)]
    #[test]
    fn stub_driver_round_trips_a_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = stub_driver(
            dir.path(),
            r#"cat > /dev/null
echo '{"kind":"schema","tables":[{"name":"users","columns":[{"name":"id","db_type":"bigint","semantic":"Int64"}],"primary_key":{"name":"users_pkey","columns":["id"]}}]}'"#,
        );

        let resolved = ResolvedDriver::resolve(path.to_str().unwrap()).expect("resolve stub");
        let schema = DriverClient::new(resolved)
            .introspect(&request())
            .expect("stub schema must decode");

        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].name, "users");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_surfaces_stderr_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = stub_driver(
            dir.path(),
            r#"cat > /dev/null
echo 'FATAL: password authentication failed' >&2
exit 3"#,
        );

        let resolved = ResolvedDriver::resolve(path.to_str().unwrap()).expect("resolve stub");
        let err = DriverClient::new(resolved)
            .introspect(&request())
            .expect_err("nonzero exit must fail");

        assert!(matches!(
            err,
            Error::Execution { stderr, .. }
                if stderr.contains("FATAL: password authentication failed")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn wedged_driver_is_killed_on_timeout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = stub_driver(dir.path(), "sleep 60");

        let resolved = ResolvedDriver::resolve(path.to_str().unwrap()).expect("resolve stub");
        let err = DriverClient::new(resolved)
            .with_timeout(Some(Duration::from_millis(200)))
            .introspect(&request())
            .expect_err("wedged driver must time out");

        assert!(matches!(err, Error::Timeout { .. }));
    }
}
