use super::*;

#[test]
fn edit_overrides_only_given_fields() {
    let existing = NewUser {
        name: "Leanne Graham".into(),
        email: "sincere@april.biz".into(),
        ..NewUser::default()
    };
    let changes = UserFieldArgs {
        email: Some("leanne@april.biz".into()),
        zipcode: Some("92998".into()),
        ..UserFieldArgs::default()
    };

    let edited = changes.apply_to(existing);
    assert_eq!(edited.name, "Leanne Graham");
    assert_eq!(edited.email, "leanne@april.biz");
    assert_eq!(edited.address.zipcode, "92998");
}

#[test]
fn list_flags_parse_into_query_types() {
    let cli = Cli::try_parse_from([
        "directory",
        "--offline",
        "list",
        "--sort-by",
        "company",
        "--order",
        "desc",
        "--fields",
        "name,company",
    ])
    .expect("parse");

    assert!(cli.offline);
    match cli.command {
        Command::List {
            sort_by,
            order,
            fields,
            search,
        } => {
            assert_eq!(sort_by, SortKey::Company);
            assert_eq!(order, SortDirection::Descending);
            assert_eq!(fields, vec![SearchField::Name, SearchField::CompanyName]);
            assert!(search.is_empty());
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn unknown_sort_key_is_rejected() {
    assert!(Cli::try_parse_from(["directory", "list", "--sort-by", "zip"]).is_err());
}
