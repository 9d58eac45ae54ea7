use super::*;

#[test]
fn formats_ten_digit_phone_numbers() {
    assert_eq!(format_phone_number("555-010-2000"), "(555) 010-2000");
    assert_eq!(
        format_phone_number("1-770-736-8031 x56442"),
        "1-770-736-8031 x56442"
    );
}

#[test]
fn prefixes_scheme_only_when_missing() {
    assert_eq!(format_website("hildegard.org"), "https://hildegard.org");
    assert_eq!(format_website("http://anastasia.net"), "http://anastasia.net");
}

#[test]
fn initials_take_first_two_words() {
    assert_eq!(initials("leanne graham"), "LG");
    assert_eq!(initials("Mrs. Dennis Schulist"), "MD");
    assert_eq!(initials("  "), "");
}

#[test]
fn truncates_by_characters() {
    assert_eq!(truncate_text("short", 10), "short");
    assert_eq!(truncate_text("Multi-layered", 5), "Multi...");
}
