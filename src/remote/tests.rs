#[cfg(test)]
mod tests {
    use crate::remote::actions::{ActionOutcome, ServiceAction};
    use crate::remote::connection::partition_unconnected;
    use crate::remote::executor::{parse_unit_list, HostLimiters};
    use crate::remote::models::{ExecOutput, Host, ServiceSpec, ServiceStatus, Snapshot};
    use crate::remote::resolver::resolve_services;

    fn spec(name: &str) -> ServiceSpec {
        ServiceSpec::new(name)
    }

    fn avail(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolver_expands_patterns_in_available_order() {
        let specs = vec![spec("web-*")];
        let available = avail(&["web-api", "web-worker", "db"]);

        let resolved = resolve_services(&specs, &available);
        let names: Vec<&str> = resolved.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["web-api", "web-worker"]);
    }

    #[test]
    fn test_resolver_first_spec_wins_dedup() {
        let mut pattern = spec("web-*");
        pattern.files = vec!["/etc/web.conf".to_string()];
        let mut exact = spec("web-api");
        exact.files = vec!["/etc/api.conf".to_string()];

        let resolved = resolve_services(
            &[pattern, exact],
            &avail(&["web-api", "web-worker"]),
        );

        let names: Vec<&str> = resolved.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["web-api", "web-worker"]);
        // web-api inherits the first matching spec's files
        assert_eq!(resolved[0].files, vec!["/etc/web.conf".to_string()]);
    }

    #[test]
    fn test_resolver_exact_name_passes_through_when_absent() {
        let resolved = resolve_services(&[spec("nginx")], &avail(&["postgres"]));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "nginx");
    }

    #[test]
    fn test_resolver_pattern_inherits_files_and_commands() {
        let mut pattern = spec("app-?");
        pattern.files = vec!["/var/log/app.log".to_string()];
        pattern.commands = vec!["df -h".to_string()];

        let resolved = resolve_services(&[pattern], &avail(&["app-1", "app-2"]));
        assert_eq!(resolved.len(), 2);
        for service in &resolved {
            assert_eq!(service.files, vec!["/var/log/app.log".to_string()]);
            assert_eq!(service.commands, vec!["df -h".to_string()]);
        }
    }

    #[test]
    fn test_resolver_idempotent_over_its_own_output() {
        let specs = vec![spec("web-*"), spec("nginx")];
        let available = avail(&["web-api", "web-worker"]);

        let first = resolve_services(&specs, &available);
        let as_specs: Vec<ServiceSpec> = first
            .iter()
            .map(|r| ServiceSpec {
                name: r.name.clone(),
                files: r.files.clone(),
                commands: r.commands.clone(),
            })
            .collect();

        let second = resolve_services(&as_specs, &available);
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolver_skips_invalid_pattern() {
        // "[web" contains a glob character but is not a valid pattern
        let resolved = resolve_services(&[spec("[web"), spec("nginx")], &avail(&["web"]));
        let names: Vec<&str> = resolved.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["nginx"]);
    }

    #[test]
    fn test_status_exit_code_mapping() {
        let out = |code: Option<i32>| ExecOutput {
            stdout: "output".to_string(),
            stderr: String::new(),
            exit_code: code,
        };

        let active = ServiceStatus::from_exit("nginx", "host1", &out(Some(0)));
        assert!(active.active);
        assert!(active.error.is_none());
        assert!(!active.not_found);

        let inactive = ServiceStatus::from_exit("nginx", "host1", &out(Some(3)));
        assert!(!inactive.active);
        assert!(inactive.error.is_none());
        assert!(!inactive.not_found);

        let missing = ServiceStatus::from_exit("nginx", "host1", &out(Some(4)));
        assert!(!missing.active);
        assert!(missing.error.is_none());
        assert!(missing.not_found);

        let failed = ServiceStatus::from_exit("nginx", "host1", &out(Some(1)));
        assert!(!failed.active);
        assert_eq!(
            failed.error.as_deref(),
            Some("systemctl exited with code 1")
        );

        let transport = ServiceStatus::from_exit(
            "nginx",
            "host1",
            &ExecOutput {
                stdout: String::new(),
                stderr: "broken pipe".to_string(),
                exit_code: None,
            },
        );
        assert!(!transport.active);
        assert_eq!(transport.error.as_deref(), Some("broken pipe"));
    }

    #[test]
    fn test_status_state_labels() {
        let base = ServiceStatus {
            service: "nginx".to_string(),
            host: "host1".to_string(),
            active: true,
            status_output: String::new(),
            error: None,
            not_found: false,
        };
        assert_eq!(base.state_label(), "● active");

        let inactive = ServiceStatus {
            active: false,
            ..base.clone()
        };
        assert_eq!(inactive.state_label(), "○ inactive");

        let missing = ServiceStatus {
            active: false,
            not_found: true,
            ..base.clone()
        };
        assert_eq!(missing.state_label(), "? not found");

        let broken = ServiceStatus {
            active: false,
            error: Some("boom".to_string()),
            ..base
        };
        assert_eq!(broken.state_label(), "⚠ boom");
    }

    #[test]
    fn test_exec_output_appends_delimited_stderr() {
        let clean = ExecOutput {
            stdout: "all good".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        };
        assert_eq!(clean.text(), "all good");

        let noisy = ExecOutput {
            stdout: "partial".to_string(),
            stderr: "warning: foo".to_string(),
            exit_code: Some(0),
        };
        assert_eq!(noisy.text(), "partial\n--- stderr ---\nwarning: foo");
    }

    #[test]
    fn test_parse_unit_list_strips_suffix_and_bullets() {
        let output = "\
nginx.service        loaded active   running nginx web server
● failed-app.service loaded failed   failed  broken app
postgres.service     loaded inactive dead    database
";
        assert_eq!(
            parse_unit_list(output),
            vec!["nginx", "failed-app", "postgres"]
        );
    }

    #[test]
    fn test_snapshot_partitions_hosts() {
        let snapshot = Snapshot {
            connect_errors: [("down1".to_string(), "Connection timed out".to_string())]
                .into_iter()
                .collect(),
            statuses: vec![ServiceStatus {
                service: "nginx".to_string(),
                host: "up1".to_string(),
                active: true,
                status_output: String::new(),
                error: None,
                not_found: false,
            }],
        };

        let hosts = ["down1", "up1", "empty1"];
        for host in hosts {
            let unreachable = snapshot.connect_error(host).is_some();
            let has_rows = snapshot.statuses_for(host).count() > 0;
            // Never both: a host with a connect error contributes no rows
            assert!(!(unreachable && has_rows), "host {} in both sets", host);
        }
        // A connected host with zero rows is still valid ("no services")
        assert!(snapshot.connect_error("empty1").is_none());
        assert_eq!(snapshot.statuses_for("empty1").count(), 0);
        assert!(snapshot.find("nginx", "up1").is_some());
    }

    #[tokio::test]
    async fn test_limiter_caps_concurrent_sessions() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let limiters = Arc::new(HostLimiters::new(8));
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let limiters = limiters.clone();
            let current = current.clone();
            let peak = peak.clone();
            tasks.push(tokio::spawn(async move {
                let limiter = limiters.limiter("host1").await;
                let _permit = limiter.acquire_owned().await.unwrap();
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 8, "peak was {}", peak.load(Ordering::SeqCst));
        assert_eq!(current.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_limiters_are_per_host() {
        let limiters = HostLimiters::new(1);
        let a = limiters.limiter("host-a").await;
        let b = limiters.limiter("host-b").await;

        let _held = a.clone().acquire_owned().await.unwrap();
        // host-a is saturated, host-b is not
        assert!(a.clone().try_acquire_owned().is_err());
        assert!(b.try_acquire_owned().is_ok());
    }

    #[test]
    fn test_connect_is_additive() {
        let hosts = vec![Host::new("a", "web"), Host::new("c", "web")];
        let connected = vec!["a".to_string(), "b".to_string()];

        // A already connected: only C needs an attempt; B untouched
        let to_attempt = partition_unconnected(&hosts, &connected);
        assert_eq!(to_attempt, vec!["c".to_string()]);
    }

    #[test]
    fn test_action_commands_and_messages() {
        assert_eq!(
            ServiceAction::Stop.command("nginx"),
            "sudo systemctl stop nginx"
        );
        assert_eq!(
            ServiceAction::Restart.command("nginx"),
            "sudo systemctl restart nginx"
        );

        let ok = ActionOutcome {
            action: ServiceAction::Restart,
            service: "nginx".to_string(),
            host: "host1".to_string(),
            error: None,
        };
        assert!(ok.is_success());
        assert_eq!(ok.message(), "Restarted nginx on host1");

        let failed = ActionOutcome {
            action: ServiceAction::Stop,
            service: "nginx".to_string(),
            host: "host1".to_string(),
            error: Some("permission denied".to_string()),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.message(), "Stop nginx: permission denied");
    }

    #[test]
    fn test_spec_pattern_detection() {
        assert!(spec("web-*").is_pattern());
        assert!(spec("app-?").is_pattern());
        assert!(spec("unit[0-9]").is_pattern());
        assert!(!spec("nginx").is_pattern());
    }
}
