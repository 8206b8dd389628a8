//! Integration tests for scopecache

mod lifecycle;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::path::Path;
    use tempfile::TempDir;

    /// Command isolated to a temp state dir and config file
    fn scopecache(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("scopecache");
        cmd.env("SCOPECACHE_STATE_DIR", dir.join("state"))
            .env("SCOPECACHE_CONFIG", dir.join("config.toml"))
            .env("NO_COLOR", "1");
        cmd
    }

    fn write_config(dir: &Path, base_url: &str) {
        let config = format!(
            r#"
            [general]
            audit_log = true

            [origin]
            base_url = "{base_url}"
            timeout_secs = 5

            [[scopes]]
            scope = "/"
            cache_name = "root-site-cache-v1"
            manifest = ["/", "/other.html"]

            [[scopes]]
            scope = "/myapp/"
            cache_name = "myapp-site-cache-v1"
            whitelist = ["myapp-site-cache-v1", "root-site-cache-v1"]
            "#
        );
        std::fs::write(dir.join("config.toml"), config).unwrap();
    }

    /// Serve `count` requests, answering each path with its own name
    fn serve(count: usize) -> (String, std::thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            for _ in 0..count {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 512];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut chunk).unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let request = String::from_utf8_lossy(&buf);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let body = format!("served {}", path);
                let reply = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });
        (base_url, handle)
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        scopecache(temp.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache lifecycle manager"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        scopecache(temp.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("scopecache"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        scopecache(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("root-site-cache-v1"))
            .stdout(predicate::str::contains("[[scopes]]"));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        scopecache(temp.path())
            .args(["config", "init"])
            .assert()
            .success();
        assert!(temp.path().join("config.toml").exists());
    }

    #[test]
    fn fetch_before_deploy_fails() {
        let temp = TempDir::new().unwrap();
        scopecache(temp.path())
            .args(["fetch", "/"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Registration not found"));
    }

    #[test]
    fn unknown_scope_fails() {
        let temp = TempDir::new().unwrap();
        scopecache(temp.path())
            .args(["install", "--scope", "/nope/"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Scope not configured"));
    }

    #[test]
    fn caches_empty() {
        let temp = TempDir::new().unwrap();
        scopecache(temp.path())
            .args(["caches", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn deploy_fetch_and_purge() {
        let temp = TempDir::new().unwrap();
        // Two manifest entries at install, then one live fetch after purge.
        let (base_url, server) = serve(3);
        write_config(temp.path(), &base_url);

        scopecache(temp.path())
            .args(["deploy"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2/2 cached"));

        scopecache(temp.path())
            .args(["status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("active"));

        scopecache(temp.path())
            .args(["caches", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("root-site-cache-v1"))
            .stdout(predicate::str::contains("myapp-site-cache-v1"));

        scopecache(temp.path())
            .args(["fetch", "/other.html"])
            .assert()
            .success()
            .stdout(predicate::str::diff("served /other.html"));

        scopecache(temp.path())
            .args(["purge"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Purged cache root-site-cache-v1"));

        scopecache(temp.path())
            .args(["fetch", "/", "--include"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("200 /"));

        server.join().unwrap();

        let audit = std::fs::read_to_string(temp.path().join("state/audit.log")).unwrap();
        assert!(audit.contains("worker.installed"));
        assert!(audit.contains("cache.purged"));
    }

    #[test]
    fn activate_sweeps_old_cache() {
        let temp = TempDir::new().unwrap();
        let (base_url, server) = serve(2);
        write_config(temp.path(), &base_url);

        // Root install leaves an extra cache behind to sweep.
        scopecache(temp.path())
            .args(["deploy", "--scope", "/"])
            .assert()
            .success();
        server.join().unwrap();

        let old = r#"{"name":"OLD_CACHE","created_at":"2024-01-15T10:00:00Z","entries":[]}"#;
        let store = scopecache::store::DiskStorage::new(temp.path().join("state/caches"));
        std::fs::write(store.cache_path("OLD_CACHE"), old).unwrap();

        // The handler skips waiting, so install alone activates and sweeps.
        scopecache(temp.path())
            .args(["install", "--scope", "/myapp/"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/myapp/ active"))
            .stdout(predicate::str::contains("Evicted OLD_CACHE"));

        scopecache(temp.path())
            .args(["caches", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("OLD_CACHE").not());
    }

    #[test]
    fn reinstall_keeps_scope_served() {
        let temp = TempDir::new().unwrap();
        // Two manifest entries per install; fetches of "/" hit the cache.
        let (base_url, server) = serve(4);
        write_config(temp.path(), &base_url);

        scopecache(temp.path())
            .args(["deploy", "--scope", "/"])
            .assert()
            .success();
        scopecache(temp.path())
            .args(["fetch", "/"])
            .assert()
            .success()
            .stdout(predicate::str::diff("served /"));

        scopecache(temp.path())
            .args(["install", "--scope", "/"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/ active"))
            .stdout(predicate::str::contains("Superseded worker"));

        scopecache(temp.path())
            .args(["fetch", "/"])
            .assert()
            .success()
            .stdout(predicate::str::diff("served /"));

        scopecache(temp.path())
            .args(["status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("active"));

        server.join().unwrap();
    }
}
