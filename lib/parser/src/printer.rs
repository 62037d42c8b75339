//! Debug rendering of expression trees as fully parenthesized prefix notation,
//! e.g. `-123 * (45.67)` becomes `(* (- 123) (group 45.67))`.

use itertools::Itertools;

use crate::Expr;

pub fn print_ast(expr: &Expr) -> String {
    match expr {
        Expr::Binary { left, operator, right } => {
            parenthesize(operator.lexeme(), &[left.as_ref(), right.as_ref()])
        }
        Expr::Grouping(expression) => parenthesize("group", &[expression.as_ref()]),
        Expr::Literal(value) => value.to_string(),
        Expr::Unary { operator, right } => parenthesize(operator.lexeme(), &[right.as_ref()]),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    format!("({} {})", name, exprs.iter().map(|e| print_ast(e)).join(" "))
}
