//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when a migration changes a table.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lower-cased.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Portfolio entries. Rows are removed with their owning user.
    projects (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Nullable<Varchar>,
        demo_link -> Nullable<Varchar>,
        github_link -> Nullable<Varchar>,
        image -> Nullable<Varchar>,
        /// One of `planned`, `current`, `finished` (CHECK constraint).
        status -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bearer tokens keyed by the SHA-256 hex digest of the plain value.
    access_tokens (token_digest) {
        token_digest -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
        last_used_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(projects -> users (user_id));
diesel::joinable!(access_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, projects, access_tokens);
