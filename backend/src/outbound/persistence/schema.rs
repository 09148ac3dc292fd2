//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. `diesel
//! print-schema` against a migrated database regenerates them.

diesel::table! {
    /// Locally owned user rows. `name` is the presence handle and the join
    /// key into the directory.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        bio -> Text,
        /// Whether the real name may be shown publicly.
        check_flag -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Linked external accounts, at most one per (user, type).
    accounts (id) {
        id -> Uuid,
        user_id -> Uuid,
        account_type -> Int2,
        display_name -> Varchar,
        url -> Text,
        pr_permitted -> Bool,
    }
}

diesel::table! {
    projects (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        link -> Text,
        since_year -> Int4,
        since_semester -> Int2,
        until_year -> Nullable<Int4>,
        until_semester -> Nullable<Int2>,
    }
}

diesel::table! {
    project_members (project_id, user_id) {
        project_id -> Uuid,
        user_id -> Uuid,
        since_year -> Int4,
        since_semester -> Int2,
        until_year -> Nullable<Int4>,
        until_semester -> Nullable<Int2>,
    }
}

diesel::table! {
    contests (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        link -> Text,
        time_start -> Timestamptz,
        time_end -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    contest_teams (id) {
        id -> Uuid,
        contest_id -> Uuid,
        name -> Varchar,
        result -> Text,
        link -> Text,
        description -> Text,
    }
}

diesel::table! {
    contest_team_user_belongings (team_id, user_id) {
        team_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::table! {
    groups (id) {
        id -> Uuid,
        name -> Varchar,
        link -> Text,
        description -> Text,
        leader -> Uuid,
    }
}

diesel::table! {
    group_user_belongings (group_id, user_id) {
        group_id -> Uuid,
        user_id -> Uuid,
        since_year -> Int4,
        since_semester -> Int2,
        until_year -> Nullable<Int4>,
        until_semester -> Nullable<Int2>,
    }
}

diesel::table! {
    /// Visibility overlay for calendar events. Absent rows mean anonymous.
    event_levels (event_id) {
        event_id -> Uuid,
        level -> Int2,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(accounts -> users (user_id));
diesel::joinable!(project_members -> projects (project_id));
diesel::joinable!(project_members -> users (user_id));
diesel::joinable!(contest_teams -> contests (contest_id));
diesel::joinable!(contest_team_user_belongings -> contest_teams (team_id));
diesel::joinable!(contest_team_user_belongings -> users (user_id));
diesel::joinable!(groups -> users (leader));
diesel::joinable!(group_user_belongings -> groups (group_id));
diesel::joinable!(group_user_belongings -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    accounts,
    projects,
    project_members,
    contests,
    contest_teams,
    contest_team_user_belongings,
    groups,
    group_user_belongings,
    event_levels,
);
