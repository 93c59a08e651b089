//! Table output formatting

use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Format a single record as a two-column field/value table
pub fn format_detail(fields: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    for (name, value) in fields {
        builder.push_record([name.to_string(), value.clone()]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct CategoryRow {
        #[tabled(rename = "SLUG")]
        slug: String,
        #[tabled(rename = "NAME")]
        name: String,
    }

    #[test]
    fn test_format_table_empty() {
        let rows: Vec<CategoryRow> = vec![];
        assert_eq!(format_table(&rows), "No results found.");
    }

    #[test]
    fn test_format_table_rows() {
        let rows = vec![
            CategoryRow {
                slug: "crickets".to_string(),
                name: "Crickets".to_string(),
            },
            CategoryRow {
                slug: "larvae".to_string(),
                name: "Larvae".to_string(),
            },
        ];

        let result = format_table(&rows);

        assert!(result.contains("SLUG"));
        assert!(result.contains("Crickets"));
        assert!(result.contains("Larvae"));
        // Rounded style uses ╭ for top-left corner
        assert!(result.contains("╭"));
    }

    #[test]
    fn test_format_detail() {
        let result = format_detail(&[
            ("Title", "Dried mealworms".to_string()),
            ("Price", "18.00 USD".to_string()),
        ]);

        assert!(result.contains("Title"));
        assert!(result.contains("18.00 USD"));
        assert!(result.contains("╰"));
    }
}
