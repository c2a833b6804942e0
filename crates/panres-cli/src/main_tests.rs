//! CLI argument parsing tests

use clap::{CommandFactory, Parser};

use crate::{Cli, Commands, ConfigAction, IndexAction, OutputFormat};

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_global_flags_default() {
    let cli = Cli::try_parse_from(["panres", "categories"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Text);
    assert!(!cli.quiet);
    assert!(cli.database.is_none());
    assert!(matches!(cli.command, Commands::Categories));
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "panres",
        "item",
        "blaTEM-1",
        "--format",
        "json",
        "-q",
        "--database",
        "/tmp/panres.db",
    ])
    .unwrap();
    assert_eq!(cli.format, OutputFormat::Json);
    assert!(cli.quiet);
    assert_eq!(
        cli.database.as_deref(),
        Some(std::path::Path::new("/tmp/panres.db"))
    );
    match cli.command {
        Commands::Item { id } => assert_eq!(id, "blaTEM-1"),
        _ => panic!("expected item command"),
    }
}

#[test]
fn test_chart_arguments() {
    let cli = Cli::try_parse_from([
        "panres",
        "chart",
        "has_resistance_class",
        "--subject-type",
        "PanGene",
        "-n",
        "5",
    ])
    .unwrap();
    match cli.command {
        Commands::Chart {
            predicate,
            subject_type,
            top_n,
            all,
        } => {
            assert_eq!(predicate, "has_resistance_class");
            assert_eq!(subject_type.as_deref(), Some("PanGene"));
            assert_eq!(top_n, Some(5));
            assert!(!all);
        }
        _ => panic!("expected chart command"),
    }

    let cli = Cli::try_parse_from(["panres", "chart", "is_from_database", "--all"]).unwrap();
    match cli.command {
        Commands::Chart { top_n, all, .. } => {
            assert_eq!(top_n, None);
            assert!(all);
        }
        _ => panic!("expected chart command"),
    }
}

#[test]
fn test_suggest_limit_is_optional() {
    let cli = Cli::try_parse_from(["panres", "suggest", "bla"]).unwrap();
    match cli.command {
        Commands::Suggest { query, limit } => {
            assert_eq!(query, "bla");
            assert_eq!(limit, None);
        }
        _ => panic!("expected suggest command"),
    }

    let cli = Cli::try_parse_from(["panres", "suggest", "bla", "--limit", "3"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Suggest { limit: Some(3), .. }
    ));
}

#[test]
fn test_related_requires_predicate_and_object() {
    assert!(Cli::try_parse_from(["panres", "related", "has_resistance_class"]).is_err());

    let cli =
        Cli::try_parse_from(["panres", "related", "has_resistance_class", "beta_lactam"]).unwrap();
    match cli.command {
        Commands::Related { predicate, object } => {
            assert_eq!(predicate, "has_resistance_class");
            assert_eq!(object, "beta_lactam");
        }
        _ => panic!("expected related command"),
    }
}

#[test]
fn test_nested_actions() {
    let cli = Cli::try_parse_from(["panres", "index", "rebuild"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Index {
            action: IndexAction::Rebuild
        }
    ));

    let cli = Cli::try_parse_from(["panres", "config", "set", "charts.top_n", "5"]).unwrap();
    match cli.command {
        Commands::Config {
            action: ConfigAction::Set { key, value },
        } => {
            assert_eq!(key, "charts.top_n");
            assert_eq!(value, "5");
        }
        _ => panic!("expected config set"),
    }

    let cli = Cli::try_parse_from(["panres", "config", "init", "--force"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            action: ConfigAction::Init { force: true }
        }
    ));
}

#[test]
fn test_unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["panres", "categories", "--format", "yaml"]).is_err());
}
