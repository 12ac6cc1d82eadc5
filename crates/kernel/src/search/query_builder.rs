//! Provider search query builder using SeaQuery.
//!
//! Renders a [`SearchPlan`] into PostgreSQL. Values are inlined as escaped
//! literals by the query builder; user text never reaches the SQL unquoted.

use sea_query::{
    Alias, Asterisk, Cond, Expr, ExprTrait, Iden, NullOrdering, Order, PostgresQueryBuilder,
    Query, SelectStatement, SimpleExpr,
};

use super::plan::SearchPlan;
use super::predicate::{Column, Op, Predicate, Value};
use crate::filter::SortKey;

#[derive(Iden)]
#[iden = "provider_profile"]
struct ProviderTable;

fn col(column: Column) -> Expr {
    Expr::col((ProviderTable, Alias::new(column.name())))
}

fn col_ref(name: &str) -> (ProviderTable, Alias) {
    (ProviderTable, Alias::new(name))
}

/// Query builder for provider searches.
pub struct ProviderQueryBuilder<'a> {
    plan: &'a SearchPlan,
}

impl<'a> ProviderQueryBuilder<'a> {
    pub fn new(plan: &'a SearchPlan) -> Self {
        Self { plan }
    }

    /// Build the page query.
    pub fn build(&self) -> String {
        let mut query = Query::select();
        query.column((ProviderTable, Asterisk)).from(ProviderTable);
        self.add_filters(&mut query);
        self.add_sorts(&mut query);
        query.limit(self.plan.limit);
        query.offset(self.plan.offset);
        query.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query over the same predicates.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();
        query.expr(Expr::col(Asterisk).count()).from(ProviderTable);
        self.add_filters(&mut query);
        query.to_string(PostgresQueryBuilder)
    }

    /// Minimum and maximum hourly rate across active profiles.
    pub fn build_price_bounds() -> String {
        let mut query = Query::select();
        query
            .expr(col(Column::HourlyRate).min())
            .expr(col(Column::HourlyRate).max())
            .from(ProviderTable)
            .and_where(col(Column::IsActive).eq(true));
        query.to_string(PostgresQueryBuilder)
    }

    fn add_filters(&self, query: &mut SelectStatement) {
        for predicate in &self.plan.predicates {
            if let Some(condition) = condition(predicate) {
                query.and_where(condition);
            }
        }
    }

    /// VIP first, then the requested key, then newest.
    fn add_sorts(&self, query: &mut SelectStatement) {
        query.order_by(col_ref("is_vip"), Order::Desc);
        match self.plan.sort {
            None | Some(SortKey::Newest) => {}
            Some(SortKey::PriceAsc) => {
                query.order_by_with_nulls(col_ref("hourly_rate"), Order::Asc, NullOrdering::Last);
            }
            Some(SortKey::PriceDesc) => {
                query.order_by_with_nulls(col_ref("hourly_rate"), Order::Desc, NullOrdering::Last);
            }
            Some(SortKey::AgeAsc) => {
                query.order_by_with_nulls(col_ref("age"), Order::Asc, NullOrdering::Last);
            }
            Some(SortKey::AgeDesc) => {
                query.order_by_with_nulls(col_ref("age"), Order::Desc, NullOrdering::Last);
            }
            Some(SortKey::Verified) => {
                query.order_by(col_ref("is_verified_by_admin"), Order::Desc);
            }
        }
        query.order_by(col_ref("id"), Order::Desc);
    }
}

/// Render one predicate. Mismatched operator/value pairs restrict to nothing.
fn condition(predicate: &Predicate) -> Option<SimpleExpr> {
    match predicate {
        Predicate::AnyOf(branches) => {
            let mut cond = Cond::any();
            for branch in branches {
                if let Some(expr) = condition(branch) {
                    cond = cond.add(expr);
                }
            }
            Some(cond.into())
        }
        Predicate::Compare { column, op, value } => Some(compare(*column, *op, value)),
    }
}

fn compare(column: Column, op: Op, value: &Value) -> SimpleExpr {
    match (op, value) {
        (Op::Eq, Value::Text(v)) => col(column).eq(v.as_str()),
        (Op::Eq, Value::Int(v)) => col(column).eq(*v),
        (Op::Eq, Value::Bool(v)) => col(column).eq(*v),
        (Op::Gte, Value::Int(v)) => col(column).gte(*v),
        (Op::Lte, Value::Int(v)) => col(column).lte(*v),
        (Op::In, Value::List(vs)) => col(column).is_in(vs.iter().map(String::as_str)),
        (Op::Contains, Value::Text(v)) => Expr::cust_with_values(
            format!("LOWER(provider_profile.{}) LIKE $1", column.name()),
            [format!("%{}%", escape_like_wildcards(&v.to_lowercase()))],
        ),
        (Op::Includes, Value::Text(v)) => Expr::cust_with_values(
            format!("$1 = ANY(provider_profile.{})", column.name()),
            [v.clone()],
        ),
        _ => {
            tracing::error!(column = column.name(), ?op, "unsupported predicate; restricting results");
            Expr::cust("FALSE")
        }
    }
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
