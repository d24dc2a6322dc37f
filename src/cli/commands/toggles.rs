use crate::sampler::DerivedMetric;
use crate::sink::{SINK_NAMES, all_factories};
use clap::{Arg, ArgAction, Command};

fn leak(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// `--status.<metric>` / `--no-status.<metric>` for every derived metric.
///
/// Neither flag has a default: when both are absent the properties file decides.
pub fn add_status_args(mut cmd: Command) -> Command {
    for metric in DerivedMetric::ALL {
        let key = metric.key();
        let enable_flag = leak(format!("status.{key}"));
        let disable_flag = leak(format!("no-status.{key}"));

        cmd = cmd
            .arg(
                Arg::new(enable_flag)
                    .long(enable_flag)
                    .help(leak(format!("Emit {key}")))
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new(disable_flag)
                    .long(disable_flag)
                    .help(leak(format!("Do not emit {key}, even if the properties file enables it")))
                    .action(ArgAction::SetTrue)
                    .overrides_with(enable_flag),
            );
    }
    cmd
}

pub fn add_sink_args(mut cmd: Command) -> Command {
    let factories = all_factories();

    for &name in SINK_NAMES {
        let default_enabled = factories
            .get(name)
            .is_some_and(|factory| factory().enabled_by_default());

        let enable_flag = leak(format!("sink.{name}"));
        let disable_flag = leak(format!("no-sink.{name}"));

        let default_indicator = if default_enabled {
            " [default: enabled]"
        } else {
            " [default: disabled]"
        };

        cmd = cmd
            .arg(
                Arg::new(enable_flag)
                    .long(enable_flag)
                    .help(leak(format!("Enable the {name} sink{default_indicator}")))
                    .action(ArgAction::SetTrue)
                    .default_value(if default_enabled { "true" } else { "false" }),
            )
            .arg(
                Arg::new(disable_flag)
                    .long(disable_flag)
                    .help(leak(format!("Disable the {name} sink")))
                    .action(ArgAction::SetTrue)
                    .overrides_with(enable_flag),
            );
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use crate::cli::dispatch::{get_enabled_sinks, get_status_toggles};

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_all_toggle_flags_are_added() {
        let matches = commands::new()
            .try_get_matches_from(vec!["mariadb_poller"])
            .unwrap();

        for &name in SINK_NAMES {
            assert!(matches.contains_id(&format!("sink.{name}")), "missing sink.{name}");
            assert!(matches.contains_id(&format!("no-sink.{name}")), "missing no-sink.{name}");
        }

        for metric in DerivedMetric::ALL {
            let key = metric.key();
            assert!(matches.contains_id(&format!("status.{key}")), "missing status.{key}");
            assert!(matches.contains_id(&format!("no-status.{key}")), "missing no-status.{key}");
        }
    }

    #[test]
    fn test_sink_default_values() {
        let matches = commands::new().get_matches_from(vec!["mariadb_poller"]);
        let factories = all_factories();

        for &name in SINK_NAMES {
            if let Some(factory) = factories.get(name) {
                let expected = factory().enabled_by_default();
                let actual = matches.get_flag(&format!("sink.{name}"));
                assert_eq!(actual, expected, "sink '{name}' default mismatch");
            }
        }
    }

    #[test]
    fn test_status_flags_default_off() {
        let matches = commands::new().get_matches_from(vec!["mariadb_poller"]);
        let (enable, disable) = get_status_toggles(&matches);

        assert!(enable.is_empty());
        assert!(disable.is_empty());
    }

    #[test]
    fn test_last_status_flag_wins() {
        let cmd = commands::new();

        let matches = cmd.clone().get_matches_from(vec![
            "mariadb_poller",
            "--status.traffic_in",
            "--no-status.traffic_in",
        ]);
        let (enable, disable) = get_status_toggles(&matches);
        assert!(enable.is_empty());
        assert_eq!(disable, vec![DerivedMetric::TrafficIn]);

        let matches = cmd.get_matches_from(vec![
            "mariadb_poller",
            "--no-status.traffic_in",
            "--status.traffic_in",
        ]);
        let (enable, disable) = get_status_toggles(&matches);
        assert_eq!(enable, vec![DerivedMetric::TrafficIn]);
        assert!(disable.is_empty());
    }

    #[test]
    fn test_sink_toggle_behavior_in_dispatch() {
        let cmd = commands::new();

        let matches = cmd
            .clone()
            .get_matches_from(vec!["mariadb_poller", "--sink.log", "--no-sink.log"]);
        assert!(!get_enabled_sinks(&matches).contains(&"log".to_string()));

        let matches = cmd.get_matches_from(vec!["mariadb_poller", "--no-sink.log", "--sink.log"]);
        assert!(get_enabled_sinks(&matches).contains(&"log".to_string()));
    }
}
