//! Executable statements

use super::{Flow, Machine, RuntimeError, Shapes};
use crate::expression::Expression;

/// A single statement of a state body, handler or conditional block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `$name = expression`
    Assign { variable: String, value: Expression },
    /// `clear`
    Clear,
    /// `display #shape @ (x, y)`
    Display {
        shape: String,
        x: Expression,
        y: Expression,
    },
    /// `goto ~state`
    Goto { target: String },
    /// `if condition { ... }`, runs when the condition is nonzero
    If {
        condition: Expression,
        body: Vec<Statement>,
    },
    /// `if not condition { ... }`, runs when the condition is zero
    IfNot {
        condition: Expression,
        body: Vec<Statement>,
    },
}

impl Statement {
    pub fn execute(&self, machine: &mut Machine, shapes: &Shapes) -> Result<Flow, RuntimeError> {
        match self {
            Statement::Assign { variable, value } => {
                let value = value.evaluate(machine)?;
                machine.set_variable(variable, value);
                Ok(Flow::Continue)
            }
            Statement::Clear => {
                machine.display_mut().clear();
                Ok(Flow::Continue)
            }
            Statement::Display { shape, x, y } => {
                let x = x.evaluate(machine)?;
                let y = y.evaluate(machine)?;
                let shape = shapes
                    .get(shape)
                    .ok_or_else(|| RuntimeError::UnknownShape(shape.clone()))?;
                machine.display_mut().overlay(shape, x, y);
                Ok(Flow::Continue)
            }
            Statement::Goto { target } => {
                machine.jump_to_state(target);
                Ok(Flow::Transferred)
            }
            Statement::If { condition, body } => {
                if condition.evaluate(machine)? != 0 {
                    execute_block(body, machine, shapes)
                } else {
                    Ok(Flow::Continue)
                }
            }
            Statement::IfNot { condition, body } => {
                if condition.evaluate(machine)? == 0 {
                    execute_block(body, machine, shapes)
                } else {
                    Ok(Flow::Continue)
                }
            }
        }
    }
}

/// Run `statements` in order until one of them transfers control
pub fn execute_block(
    statements: &[Statement],
    machine: &mut Machine,
    shapes: &Shapes,
) -> Result<Flow, RuntimeError> {
    for statement in statements {
        if statement.execute(machine, shapes)? == Flow::Transferred {
            return Ok(Flow::Transferred);
        }
    }
    Ok(Flow::Continue)
}
