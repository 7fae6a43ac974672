//! Diesel schema for sync state tables.

diesel::table! {
    /// Task sync state rows keyed by namespaced source item id.
    task_sync_states (key) {
        /// Namespaced row key: `<namespace>/tasks/<source_item_id>`.
        key -> Text,
        /// Source item identifier.
        external_id -> Text,
        /// Destination page id, once created.
        dest_page_id -> Nullable<Text>,
        /// SHA-256 of the last forward payload written.
        payload_hash -> Nullable<Text>,
        /// Hash recognizing destination echoes.
        echo_hash -> Nullable<Text>,
        /// Canonical sync status string.
        sync_status -> Text,
        /// Canonical sync source string.
        sync_source -> Text,
        /// Last successful sync timestamp.
        last_synced_at -> Nullable<Timestamptz>,
        /// Failure detail for error rows.
        error_note -> Nullable<Text>,
    }
}

diesel::table! {
    /// Project sync state rows keyed by namespaced source project id.
    project_sync_states (key) {
        /// Namespaced row key: `<namespace>/projects/<source_project_id>`.
        key -> Text,
        /// Source project identifier.
        source_project_id -> Text,
        /// Materialized destination page id.
        dest_page_id -> Text,
        /// Project page creation timestamp.
        created_at -> Timestamptz,
        /// Last name the engine wrote back to the source.
        name_last_written_source -> Nullable<Text>,
        /// Areas freeze timestamp, set once at creation.
        areas_frozen_at -> Nullable<Timestamptz>,
        /// Hash recognizing destination echoes.
        echo_hash -> Nullable<Text>,
        /// Last engine write timestamp.
        last_synced_at -> Nullable<Timestamptz>,
    }
}
