//! Migrations embedded at compile time

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All embedded migrations, in application order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_tenant_settings",
            sql: include_str!("../../migrations/001_tenant_settings.sql"),
        },
        Migration {
            id: "002_timer_groups",
            sql: include_str!("../../migrations/002_timer_groups.sql"),
        },
    ]
}
