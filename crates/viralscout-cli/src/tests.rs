use super::*;

#[test]
fn parses_discover_with_repeated_terms_and_defaults() {
    let cli = Cli::try_parse_from([
        "viralscout-cli",
        "discover",
        "--term",
        "dance",
        "--term",
        "cooking",
        "--spreadsheet-id",
        "sheet-1",
    ])
    .expect("expected valid cli args");

    let Commands::Discover(args) = cli.command else {
        panic!("expected discover");
    };
    assert_eq!(args.terms, vec!["dance", "cooking"]);
    assert_eq!(args.sheet.spreadsheet_id, "sheet-1");
    assert_eq!(args.sheet.sheet_name, "Creators");
    assert_eq!(args.max_videos_per_term, 100);
    assert_eq!(args.top, 20);
}

#[test]
fn discover_requires_a_term() {
    let err = Cli::try_parse_from(["viralscout-cli", "discover", "--spreadsheet-id", "s"])
        .expect_err("term is required");
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn parses_enrich_with_sheet_name() {
    let cli = Cli::try_parse_from([
        "viralscout-cli",
        "enrich",
        "--spreadsheet-id",
        "s",
        "--sheet-name",
        "Leads",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Enrich(EnrichArgs { ref sheet }) if sheet.sheet_name == "Leads"
    ));
}

#[test]
fn parses_analyze_overrides() {
    let cli = Cli::try_parse_from([
        "viralscout-cli",
        "analyze",
        "--spreadsheet-id",
        "s",
        "--max-creators",
        "5",
        "--videos-per-creator",
        "3",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Analyze(AnalyzeArgs {
            max_creators: Some(5),
            videos_per_creator: Some(3),
            ..
        })
    ));
}

#[test]
fn parses_archive_video_ids() {
    let cli = Cli::try_parse_from([
        "viralscout-cli",
        "archive",
        "--parent-folder-id",
        "root",
        "--video-id",
        "v1",
        "--video-id",
        "v2",
    ])
    .expect("expected valid cli args");

    let Commands::Archive(args) = cli.command else {
        panic!("expected archive");
    };
    assert_eq!(args.parent_folder_id, "root");
    assert_eq!(args.video_ids, vec!["v1", "v2"]);
}

#[test]
fn archive_requires_a_video_id() {
    let err = Cli::try_parse_from(["viralscout-cli", "archive", "--parent-folder-id", "root"])
        .expect_err("video id is required");
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["viralscout-cli"]).is_err());
}
