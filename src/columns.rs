use polars::prelude::*;

const CSV_SUFFIX: &str = ".csv";

/// Trim, turn spaces and hyphens into underscores, lowercase.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim().replace([' ', '-'], "_").to_lowercase()
}

/// Lowercased file stem, or `None` unless the name ends in exactly `.csv`
/// and has a non-empty stem.
pub fn table_name_for(file_name: &str) -> Option<String> {
    file_name
        .strip_suffix(CSV_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .map(|stem| stem.to_lowercase())
}

pub fn normalize_columns(df: &mut DataFrame) -> PolarsResult<()> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| normalize_column_name(name))
        .collect();
    df.set_column_names(&names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spaces_hyphens_and_case() {
        assert_eq!(normalize_column_name(" Customer ID"), "customer_id");
        assert_eq!(normalize_column_name("Sales-Date"), "sales_date");
        assert_eq!(normalize_column_name("  Cust Name  "), "cust_name");
        assert_eq!(normalize_column_name("ORDER - Total"), "order___total");
        assert_eq!(normalize_column_name("already_ok"), "already_ok");
    }

    #[test]
    fn outer_whitespace_is_trimmed_before_replacing() {
        // a leading tab or trailing space must not become an underscore
        assert_eq!(normalize_column_name("\tPrd Key "), "prd_key");
    }

    #[test]
    fn table_name_is_case_folded_stem() {
        assert_eq!(table_name_for("CUSTOMERS.csv").as_deref(), Some("customers"));
        assert_eq!(table_name_for("cust_info.csv").as_deref(), Some("cust_info"));
        assert_eq!(table_name_for("archive.2024.csv").as_deref(), Some("archive.2024"));
    }

    #[test]
    fn only_exact_csv_suffix_counts() {
        assert_eq!(table_name_for("readme.txt"), None);
        assert_eq!(table_name_for("DATA.CSV"), None);
        assert_eq!(table_name_for("data.csv.bak"), None);
        assert_eq!(table_name_for("csv"), None);
        assert_eq!(table_name_for(".csv"), None);
    }

    #[test]
    fn renames_frame_columns_in_place() -> PolarsResult<()> {
        let mut df = df!(
            " Cust ID" => &[1i64, 2],
            "Cust-Name" => &["a", "b"],
        )?;
        normalize_columns(&mut df)?;
        assert_eq!(df.get_column_names(), &["cust_id", "cust_name"]);
        Ok(())
    }
}
