//! Token kinds and rule names of the game language

// Terminals
pub const STATE_NAME: &str = "state-name";
pub const SHAPE_NAME: &str = "shape-name";
pub const HANDLER_NAME: &str = "handler-name";
pub const VARIABLE: &str = "variable";

pub const GOTO: &str = "goto";
pub const CLEAR: &str = "clear-screen";
pub const DISPLAY: &str = "display-shape";
pub const IF: &str = "if";
pub const NOT: &str = "not";
pub const RANDOM: &str = "rand";

pub const ASSIGN: &str = "assignment-op";
pub const AT: &str = "coordinate-op";
pub const COMMA: &str = "comma";
pub const LEFT_BRACE: &str = "left-brace";
pub const RIGHT_BRACE: &str = "right-brace";
pub const LEFT_PAREN: &str = "left-paren";
pub const RIGHT_PAREN: &str = "right-paren";

pub const SHAPE: &str = "shape";
pub const SINGLE_EXPRESSION: &str = "single-expression";
pub const NEWLINE: &str = "newline";

// Nonterminals
pub const PROG: &str = "prog";
pub const TOP_LEVEL_STMTS: &str = "top-level-stmts";
pub const TOP_LEVEL_STMT: &str = "top-level-stmt";
pub const SHAPE_DEF: &str = "shape-def";
pub const STATE_DEF: &str = "state-def";
pub const INSTATE_STMTS: &str = "instate-stmts";
pub const INSTATE_STMT: &str = "instate-stmt";
pub const EXPRESSION: &str = "expression";
pub const VARIABLE_UPDATE_STMT: &str = "variable-update-stmt";
pub const SCREEN_UPDATE_STMT: &str = "screen-update-stmt";
pub const GOTO_STMT: &str = "goto-stmt";
pub const SELECTION_STMT: &str = "selection-stmt";
pub const IF_STMT: &str = "if-stmt";
pub const IF_NOT_STMT: &str = "if-not-stmt";
pub const INIF_STMTS: &str = "inif-stmts";
pub const INIF_STMT: &str = "inif-stmt";
pub const BTN_HANDLER: &str = "btn-handler";
pub const INHANDLER_STMTS: &str = "inhandler-stmts";
pub const INHANDLER_STMT: &str = "inhandler-stmt";
