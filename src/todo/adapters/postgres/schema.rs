//! Diesel schema for todo persistence.

diesel::table! {
    /// Todo records.
    todo (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Todo text.
        #[max_length = 255]
        task -> Varchar,
        /// Completion flag.
        done -> Bool,
        /// Creation timestamp assigned by the column default.
        #[sql_name = "createdAt"]
        created_at -> Timestamptz,
    }
}
