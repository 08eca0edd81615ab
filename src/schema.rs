diesel::table! {
    compare_results (id) {
        #[sql_name = "Id"]
        id -> Integer,
        // INTEGER in the migration; SQLite affinity stores whole-number
        // doubles as integers and reads them back as doubles.
        #[sql_name = "Expected_Column_Count"]
        expected_column_count -> Double,
        #[sql_name = "Actual_Column_Count"]
        actual_column_count -> BigInt,
        // INTEGER in the migration, see above.
        #[sql_name = "Expected_Row_Count"]
        expected_row_count -> Double,
        #[sql_name = "Actual_Row_Count"]
        actual_row_count -> BigInt,
        #[sql_name = "Validation_Status"]
        validation_status -> Text,
        #[sql_name = "Description"]
        description -> Text,
        #[sql_name = "Timestamp"]
        created_at -> Timestamp,
    }
}
