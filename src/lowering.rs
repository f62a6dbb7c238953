//! Semantic lowering
//!
//! Turns the parse tree of a program into a runnable [`Game`]. Each grammar rule has one lowering
//! function, dispatched on the node tag, so the shape of this module follows the grammar in
//! [`crate::language`] closely.
//!
//! Name resolution is deferred: a `display` of an undefined shape or a `goto` to an undefined
//! state lowers fine and only fails when it runs. Two definitions sharing a name (shapes, states,
//! or handlers of one state) keep the later one and log a warning.

use crate::expression::{EvalError, Expression};
use crate::language::symbols::*;
use crate::lexing::Position;
use crate::parsing::ParseNode;
use crate::runtime::{
    Button, Game, GameSettings, GameState, InvalidPixel, Shape, Shapes, Statement,
};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;

/// Errors raised while lowering a parse tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    /// The tree does not have the shape the language grammar produces
    UnexpectedNode {
        expected: &'static str,
        found: String,
        position: Option<Position>,
    },
    InvalidShape {
        name: String,
        pixel: InvalidPixel,
        position: Option<Position>,
    },
    /// An expression literal does not parse
    Expression {
        error: EvalError,
        position: Option<Position>,
    },
}

impl LowerError {
    pub fn position(&self) -> Option<Position> {
        match self {
            LowerError::UnexpectedNode { position, .. }
            | LowerError::InvalidShape { position, .. }
            | LowerError::Expression { position, .. } => *position,
        }
    }
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::UnexpectedNode {
                expected, found, ..
            } => write!(f, "Expected {expected} node, found {found}"),
            LowerError::InvalidShape { name, pixel, .. } => {
                write!(f, "Shape {name} has an {pixel}")
            }
            LowerError::Expression { error, .. } => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for LowerError {}

/// Lower a whole program tree
pub fn lower(root: &ParseNode, settings: GameSettings) -> Result<Game, LowerError> {
    let mut lowering = Lowering::default();
    let initial = lowering.program(root)?;
    log::debug!(
        "lowered {} states and {} shapes, starting in {}",
        lowering.states.len(),
        lowering.shapes.len(),
        initial
    );
    Ok(Game::new(lowering.states, initial, lowering.shapes, settings))
}

fn unexpected(expected: &'static str, node: &ParseNode) -> LowerError {
    LowerError::UnexpectedNode {
        expected,
        found: node.tag().to_string(),
        position: first_position(node),
    }
}

/// Position of the leftmost leaf below `node`
fn first_position(node: &ParseNode) -> Option<Position> {
    node.position
        .or_else(|| node.children.iter().find_map(first_position))
}

fn expect<'n>(node: &'n ParseNode, tag: &'static str) -> Result<&'n ParseNode, LowerError> {
    if node.tag() == tag {
        Ok(node)
    } else {
        Err(unexpected(tag, node))
    }
}

/// Items of a left-recursive `list := list NL item | item` rule, in source order
fn list_items<'n>(
    node: &'n ParseNode,
    list: &'static str,
) -> Result<Vec<&'n ParseNode>, LowerError> {
    let mut items = Vec::new();
    let mut current = expect(node, list)?;
    loop {
        match current.children.as_slice() {
            [rest, _, item] => {
                items.push(item);
                current = expect(rest, list)?;
            }
            [item] => {
                items.push(item);
                break;
            }
            _ => return Err(unexpected(list, current)),
        }
    }
    items.reverse();
    Ok(items)
}

/// Sole child of a pass-through rule such as `top-level-stmt := shape-def`
fn only_child<'n>(node: &'n ParseNode, tag: &'static str) -> Result<&'n ParseNode, LowerError> {
    match expect(node, tag)?.children.as_slice() {
        [child] => Ok(child),
        _ => Err(unexpected(tag, node)),
    }
}

fn leaf_text(node: &ParseNode, tag: &'static str) -> Result<String, LowerError> {
    Ok(expect(node, tag)?.lexeme().to_string())
}

#[derive(Default)]
struct Lowering {
    states: IndexMap<String, GameState>,
    shapes: Shapes,
}

impl Lowering {
    /// Returns the initial state name
    fn program(&mut self, node: &ParseNode) -> Result<String, LowerError> {
        let [initial, _, definitions, _] = expect(node, PROG)?.children.as_slice() else {
            return Err(unexpected(PROG, node));
        };
        for definition in list_items(definitions, TOP_LEVEL_STMTS)? {
            self.definition(only_child(definition, TOP_LEVEL_STMT)?)?;
        }
        leaf_text(initial, STATE_NAME)
    }

    fn definition(&mut self, node: &ParseNode) -> Result<(), LowerError> {
        match node.tag() {
            SHAPE_DEF => {
                let (name, shape) = shape_definition(node)?;
                if self.shapes.insert(name.clone(), shape).is_some() {
                    log::warn!("shape {name} is defined more than once, keeping the last one");
                }
            }
            STATE_DEF => {
                let (name, state) = state_definition(node)?;
                if self.states.insert(name.clone(), state).is_some() {
                    log::warn!("state {name} is defined more than once, keeping the last one");
                }
            }
            _ => return Err(unexpected(TOP_LEVEL_STMT, node)),
        }
        Ok(())
    }
}

fn shape_definition(node: &ParseNode) -> Result<(String, Shape), LowerError> {
    let [name, _, _, body, _] = node.children.as_slice() else {
        return Err(unexpected(SHAPE_DEF, node));
    };
    let name = leaf_text(name, SHAPE_NAME)?;
    let body = expect(body, SHAPE)?;
    let shape = Shape::parse(body.lexeme()).map_err(|pixel| LowerError::InvalidShape {
        name: name.clone(),
        pixel,
        position: body.position,
    })?;
    Ok((name, shape))
}

fn state_definition(node: &ParseNode) -> Result<(String, GameState), LowerError> {
    let [name, _, _, members, _, _] = node.children.as_slice() else {
        return Err(unexpected(STATE_DEF, node));
    };
    let name = leaf_text(name, STATE_NAME)?;

    let mut statements = Vec::new();
    let mut handlers = BTreeMap::new();
    for member in list_items(members, INSTATE_STMTS)? {
        let member = only_child(member, INSTATE_STMT)?;
        if member.tag() == BTN_HANDLER {
            let (button, body) = handler(member)?;
            if handlers.insert(button, body).is_some() {
                log::warn!("state {name} handles {button} more than once, keeping the last one");
            }
        } else {
            statements.push(statement(member)?);
        }
    }
    Ok((name, GameState::new(statements, handlers)))
}

fn handler(node: &ParseNode) -> Result<(Button, Vec<Statement>), LowerError> {
    let [label, _, _, body, _, _] = node.children.as_slice() else {
        return Err(unexpected(BTN_HANDLER, node));
    };
    let label = expect(label, HANDLER_NAME)?;
    let button =
        Button::from_handler_name(label.lexeme()).ok_or_else(|| unexpected(HANDLER_NAME, label))?;
    Ok((button, block(body, INHANDLER_STMTS, INHANDLER_STMT)?))
}

/// Statements of an `if` or handler body
fn block(
    node: &ParseNode,
    list: &'static str,
    item: &'static str,
) -> Result<Vec<Statement>, LowerError> {
    list_items(node, list)?
        .into_iter()
        .map(|member| statement(only_child(member, item)?))
        .collect()
}

fn statement(node: &ParseNode) -> Result<Statement, LowerError> {
    let children = node.children.as_slice();
    match node.tag() {
        VARIABLE_UPDATE_STMT => match children {
            [variable, _, value] => Ok(Statement::Assign {
                variable: leaf_text(variable, VARIABLE)?,
                value: expression(value)?,
            }),
            _ => Err(unexpected(VARIABLE_UPDATE_STMT, node)),
        },
        SCREEN_UPDATE_STMT => match children {
            [clear] => {
                expect(clear, CLEAR)?;
                Ok(Statement::Clear)
            }
            [_, shape, _, _, x, _, y, _] => Ok(Statement::Display {
                shape: leaf_text(shape, SHAPE_NAME)?,
                x: expression(x)?,
                y: expression(y)?,
            }),
            _ => Err(unexpected(SCREEN_UPDATE_STMT, node)),
        },
        GOTO_STMT => match children {
            [_, target] => Ok(Statement::Goto {
                target: leaf_text(target, STATE_NAME)?,
            }),
            _ => Err(unexpected(GOTO_STMT, node)),
        },
        SELECTION_STMT => match children {
            [selection] => statement(selection),
            _ => Err(unexpected(SELECTION_STMT, node)),
        },
        IF_STMT => match children {
            [_, condition, _, _, body, _, _] => Ok(Statement::If {
                condition: expression(condition)?,
                body: block(body, INIF_STMTS, INIF_STMT)?,
            }),
            _ => Err(unexpected(IF_STMT, node)),
        },
        IF_NOT_STMT => match children {
            [_, _, condition, _, _, body, _, _] => Ok(Statement::IfNot {
                condition: expression(condition)?,
                body: block(body, INIF_STMTS, INIF_STMT)?,
            }),
            _ => Err(unexpected(IF_NOT_STMT, node)),
        },
        _ => Err(unexpected("statement", node)),
    }
}

fn expression(node: &ParseNode) -> Result<Expression, LowerError> {
    match expect(node, EXPRESSION)?.children.as_slice() {
        [single] => single_expression(single),
        [_, first, second] => Ok(Expression::random(
            single_expression(first)?,
            single_expression(second)?,
        )),
        _ => Err(unexpected(EXPRESSION, node)),
    }
}

fn single_expression(node: &ParseNode) -> Result<Expression, LowerError> {
    let leaf = expect(node, SINGLE_EXPRESSION)?;
    Expression::parse(leaf.lexeme()).map_err(|error| LowerError::Expression {
        error,
        position: leaf.position,
    })
}
