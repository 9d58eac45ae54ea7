//! Plain-text views over directory records.

use shared::{
    domain::UserRecord,
    error::FieldErrors,
    format::{format_phone_number, format_website, initials, truncate_text},
};

const NAME_WIDTH: usize = 24;
const EMAIL_WIDTH: usize = 28;
const COMPANY_WIDTH: usize = 22;

pub fn user_table(records: &[UserRecord]) -> String {
    let mut out = format!(
        "{:>4}  {:<NAME_WIDTH$}  {:<EMAIL_WIDTH$}  {:<COMPANY_WIDTH$}  {}\n",
        "ID", "NAME", "EMAIL", "COMPANY", "PHONE"
    );
    for record in records {
        out.push_str(&format!(
            "{:>4}  {:<NAME_WIDTH$}  {:<EMAIL_WIDTH$}  {:<COMPANY_WIDTH$}  {}\n",
            record.id,
            truncate_text(&record.name, NAME_WIDTH - 3),
            truncate_text(&record.email, EMAIL_WIDTH - 3),
            truncate_text(&record.company.name, COMPANY_WIDTH - 3),
            format_phone_number(&record.phone),
        ));
    }
    if records.is_empty() {
        out.push_str("(no matching users)\n");
    }
    out
}

pub fn user_detail(record: &UserRecord) -> String {
    let address = &record.address;
    let company = &record.company;
    let mut lines = vec![
        format!("[{}] {} (#{})", initials(&record.name), record.name, record.id),
        format!("  email:    {}", record.email),
        format!("  phone:    {}", format_phone_number(&record.phone)),
        format!("  website:  {}", format_website(&record.website)),
        format!(
            "  address:  {}, {}, {} {}",
            address.street, address.suite, address.city, address.zipcode
        ),
    ];
    if !address.geo.lat.is_empty() || !address.geo.lng.is_empty() {
        lines.push(format!("  geo:      {}, {}", address.geo.lat, address.geo.lng));
    }
    lines.push(format!("  company:  {}", company.name));
    lines.push(format!("            \"{}\"", company.catch_phrase));
    lines.push(format!("            {}", company.bs));
    lines.join("\n")
}

pub fn field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|error| format!("  {}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
