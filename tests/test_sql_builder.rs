//! Unit tests for the SqlBuilder query construction.

use coinfolio::SqlBuilder;

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("holdings").build();
    assert_eq!(sql, "SELECT *\nFROM holdings");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("holdings")
        .select(&["coin", "amount"])
        .build();
    assert!(sql.starts_with("SELECT coin, amount\n"));
}

#[test]
fn where_eq_adds_equality_with_param() {
    let (sql, params) = SqlBuilder::new("accounts")
        .where_eq("username", "alice")
        .build();
    assert!(sql.contains("WHERE username = ?"));
    assert_eq!(params, vec!["alice"]);
}

#[test]
fn multiple_conditions_are_anded_in_order() {
    let (sql, params) = SqlBuilder::new("holdings")
        .where_eq("user_id", "7")
        .where_clause("amount > ?", &["0"])
        .build();
    assert!(sql.contains("WHERE user_id = ? AND amount > ?"));
    assert_eq!(params, vec!["7", "0"]);
}

#[test]
fn values_are_never_interpolated() {
    let (sql, params) = SqlBuilder::new("accounts")
        .where_eq("username", "x'; DROP TABLE accounts; --")
        .build();
    assert!(!sql.contains("DROP"));
    assert_eq!(params.len(), 1);
}

#[test]
fn order_by_and_limit_come_last() {
    let (sql, _) = SqlBuilder::new("holdings")
        .where_eq("user_id", "1")
        .order_by(&["id ASC"])
        .limit(5)
        .build();
    assert!(sql.ends_with("ORDER BY id ASC\nLIMIT 5"));
}
