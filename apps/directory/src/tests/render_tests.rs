use shared::domain::{NewUser, UserId};

use super::*;

fn leanne() -> UserRecord {
    let mut fields = NewUser {
        name: "Leanne Graham".into(),
        email: "Sincere@april.biz".into(),
        phone: "770-736-8031".into(),
        website: "hildegard.org".into(),
        ..NewUser::default()
    };
    fields.company.name = "Romaguera-Crona".into();
    fields.into_record(UserId(1))
}

#[test]
fn table_lists_each_record() {
    let table = user_table(&[leanne()]);
    assert_eq!(table.lines().count(), 2);
    assert!(table.contains("Leanne Graham"));
    assert!(table.contains("(770) 736-8031"));
}

#[test]
fn empty_table_says_so() {
    assert!(user_table(&[]).contains("no matching users"));
}

#[test]
fn detail_shows_initials_and_site() {
    let detail = user_detail(&leanne());
    assert!(detail.starts_with("[LG] Leanne Graham (#1)"));
    assert!(detail.contains("https://hildegard.org"));
    assert!(!detail.contains("geo:"));
}

#[test]
fn field_errors_render_one_per_line() {
    let mut errors = FieldErrors::new();
    errors.insert("name", "Name is required");
    errors.insert("email", "Please enter a valid email");
    assert_eq!(
        field_errors(&errors),
        "  name: Name is required\n  email: Please enter a valid email"
    );
}
