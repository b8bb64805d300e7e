//! Integration tests for fragcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use serial_test::serial;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn fragcache() -> Command {
        cargo_bin_cmd!("fragcache")
    }

    /// Write a config whose storage lives inside `dir`
    fn write_config(dir: &Path, extra: &str) -> PathBuf {
        let path = dir.join("config.toml");
        let content = format!(
            r#"
[cache]
log_level = "verbose"

[storage]
blob_dir = "{blobs}"
metadata_path = "{metadata}"
log_path = "{log}"

[[regions]]
name = "sidebar"
ttl_secs = 3600

[[regions]]
name = "pages"
ttl_secs = 3600
{extra}
"#,
            blobs = dir.join("blobs").display(),
            metadata = dir.join("metadata.json").display(),
            log = dir.join("cache.log").display(),
            extra = extra,
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    fn with_config(config: &Path) -> Command {
        let mut cmd = fragcache();
        cmd.env_remove("FRAGCACHE_CONFIG").arg("--config").arg(config);
        cmd
    }

    #[test]
    fn help_displays() {
        fragcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("file-backed TTL fragment cache"));
    }

    #[test]
    fn version_displays() {
        fragcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("fragcache"));
    }

    #[test]
    #[serial]
    fn config_path_from_env() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("from-env.toml");

        fragcache()
            .env("FRAGCACHE_CONFIG", &path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("from-env.toml"));
    }

    #[test]
    #[serial]
    fn config_path_default() {
        fragcache()
            .env_remove("FRAGCACHE_CONFIG")
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_then_show() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        with_config(&path)
            .args(["config", "init"])
            .assert()
            .success();
        assert!(path.exists());

        with_config(&path)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[[regions]]"))
            .stdout(predicate::str::contains("homepage"));
    }

    #[test]
    fn set_then_get_roundtrip() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["set", "pages", "--sub", "12"])
            .write_stdin("<article>hello</article>")
            .assert()
            .success();

        with_config(&config)
            .args(["get", "pages", "--sub", "12"])
            .assert()
            .success()
            .stdout("<article>hello</article>");

        assert!(temp.path().join("blobs").join("pages_12").exists());
    }

    #[test]
    fn set_from_file() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        let fragment = temp.path().join("sidebar.html");
        std::fs::write(&fragment, "<ul><li>recent</li></ul>").unwrap();

        with_config(&config)
            .args(["set", "sidebar", "--file"])
            .arg(&fragment)
            .assert()
            .success();

        with_config(&config)
            .args(["get", "sidebar"])
            .assert()
            .success()
            .stdout("<ul><li>recent</li></ul>");
    }

    #[test]
    fn get_never_set_is_miss() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["get", "pages", "--sub", "404"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache miss: pages_404"))
            .stderr(predicate::str::contains("fragcache set"));
    }

    #[test]
    fn invalidate_region_then_get_misses() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        for sub in ["1", "2"] {
            with_config(&config)
                .args(["set", "pages", "--sub", sub])
                .write_stdin("page")
                .assert()
                .success();
        }
        with_config(&config)
            .args(["set", "sidebar"])
            .write_stdin("side")
            .assert()
            .success();

        with_config(&config)
            .args(["invalidate", "pages"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Invalidated 2 entries"));

        with_config(&config)
            .args(["get", "pages", "--sub", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache miss"));

        with_config(&config)
            .args(["get", "sidebar"])
            .assert()
            .success()
            .stdout("side");
    }

    #[test]
    fn published_event_clears_everything() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["set", "sidebar"])
            .write_stdin("side")
            .assert()
            .success();

        with_config(&config)
            .args(["event", "published"])
            .assert()
            .success();

        with_config(&config)
            .args(["get", "sidebar"])
            .assert()
            .failure();
    }

    #[test]
    fn comment_event_only_clears_pages() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["set", "sidebar"])
            .write_stdin("side")
            .assert()
            .success();
        with_config(&config)
            .args(["set", "pages", "--sub", "7"])
            .write_stdin("page")
            .assert()
            .success();

        with_config(&config)
            .args(["event", "comment-posted"])
            .assert()
            .success();

        with_config(&config)
            .args(["get", "pages", "--sub", "7"])
            .assert()
            .failure();
        with_config(&config)
            .args(["get", "sidebar"])
            .assert()
            .success();
    }

    #[test]
    fn unknown_event_is_rejected() {
        fragcache()
            .args(["event", "archived"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown event"));
    }

    #[test]
    fn unconfigured_region_fails() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["get", "homepage"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unconfigured cache region"));
    }

    #[test]
    fn status_lists_entries_as_json() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["set", "pages", "--sub", "3"])
            .write_stdin("page")
            .assert()
            .success();

        with_config(&config)
            .args(["status", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"key\": \"pages_3\""))
            .stdout(predicate::str::contains("\"state\": \"fresh\""));

        with_config(&config)
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("pages_3\tfresh"));
    }

    #[test]
    fn disabled_cache_never_hits() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["set", "sidebar"])
            .write_stdin("side")
            .assert()
            .success();

        let disabled = temp.path().join("disabled.toml");
        let content = std::fs::read_to_string(&config)
            .unwrap()
            .replace("[cache]\n", "[cache]\nenabled = false\n");
        std::fs::write(&disabled, content).unwrap();

        with_config(&disabled)
            .args(["get", "sidebar"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cache disabled"));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let temp = TempDir::new().unwrap();
        let config = write_config(
            temp.path(),
            "\n[[regions]]\nname = \"page\"\nttl_secs = 10\n",
        );

        with_config(&config)
            .args(["status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("fragcache config path"));

        with_config(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_loading_is_traced() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["status", "-vv"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Loaded config from"));
    }

    #[test]
    fn misspelled_log_format_is_rejected() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        let content = std::fs::read_to_string(&config).unwrap();
        std::fs::write(&config, format!("[general]\nlog_format = \"jsno\"\n{}", content)).unwrap();

        with_config(&config)
            .args(["status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn json_log_format_from_config() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");
        let content = std::fs::read_to_string(&config).unwrap();
        std::fs::write(&config, format!("[general]\nlog_format = \"json\"\n{}", content)).unwrap();

        with_config(&config)
            .args(["event", "published", "-v"])
            .assert()
            .success()
            .stderr(predicate::str::contains("\"level\":\"INFO\""))
            .stderr(predicate::str::contains("Content event: published"));
    }

    #[test]
    fn verbose_log_records_operations() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "");

        with_config(&config)
            .args(["set", "pages"])
            .write_stdin("page")
            .assert()
            .success();

        let log = std::fs::read_to_string(temp.path().join("cache.log")).unwrap();
        assert!(log.contains("\"event\":\"set\""));
        assert!(log.contains("\"event\":\"store\""));
        assert!(log.contains("\"event\":\"refresh\""));
    }
}
