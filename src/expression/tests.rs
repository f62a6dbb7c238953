use super::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use std::collections::{BTreeSet, HashMap};

struct Scope {
    variables: HashMap<String, i64>,
    rng: StdRng,
}

impl Scope {
    fn new() -> Self {
        Self {
            variables: HashMap::new(),
            rng: StdRng::seed_from_u64(7),
        }
    }

    fn with(mut self, name: &str, value: i64) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }
}

impl Environment for Scope {
    fn variable(&self, name: &str) -> i64 {
        self.variables.get(name).copied().unwrap_or(0)
    }

    fn constant(&self, name: &str) -> Option<i64> {
        match name {
            "!W" => Some(30),
            "!H" => Some(20),
            "!FPS" => Some(25),
            _ => None,
        }
    }

    fn random_range(&mut self, low: i64, high: i64) -> i64 {
        self.rng.gen_range(low..=high)
    }
}

fn eval(text: &str) -> Result<i64, EvalError> {
    evaluate(text, &mut Scope::new().with("$x", 21).with("$neg", -4))
}

#[rstest]
#[case("[2+3*4]", 14)]
#[case("[(2+3)*4]", 20)]
#[case("[-3+5]", 2)]
#[case("[10/3]", 3)]
#[case("[10%3]", 1)]
#[case("[-7/2]", -4)]
#[case("[-7%2]", 1)]
#[case("[7 % -2]", -1)]
#[case("[2 - 3 - 4]", -5)]
#[case("[20 / 2 / 5]", 2)]
#[case("[--3]", 3)]
#[case("[-(2+3)]", -5)]
#[case("[2*-3]", -6)]
#[case("[~0]", 1)]
#[case("[~5]", 0)]
#[case("[~~7]", 1)]
#[case("[3 > 2]", 1)]
#[case("[2 >= 3]", 0)]
#[case("[2 <= 2]", 1)]
#[case("[1 + 2 < 4]", 1)]
#[case("[1 + 2 = 3]", 1)]
#[case("[4 ~= 4]", 0)]
#[case("[1 = 1 & 2 ~= 2]", 0)]
#[case("[0 | 4]", 1)]
#[case("[-1 & 3]", 1)]
#[case("[$x * 2]", 42)]
#[case("[$neg * $neg]", 16)]
#[case("[$unset + 1]", 1)]
#[case("[!W - 1]", 29)]
#[case("[-!H]", -20)]
#[case("[!FPS % 7]", 4)]
#[case("[ 7 ]", 7)]
#[case("[((((1))))]", 1)]
fn test_values(#[case] text: &str, #[case] expected: i64) {
    assert_eq!(eval(text), Ok(expected), "{text}");
}

#[rstest]
#[case("[2+3*4]", "(2 + (3 * 4))")]
#[case("[1 - 2 - 3]", "((1 - 2) - 3)")]
#[case("[1 | 2 & 3]", "((1 | 2) & 3)")]
#[case("[--3]", "--3")]
#[case("[-(1+2)*3]", "(-(1 + 2) * 3)")]
#[case("[$a < !W = 1]", "(($a < !W) = 1)")]
#[case("[r 1 -$b]", "r(1, -$b)")]
#[case("[r (1+2) ~0]", "r((1 + 2), ~0)")]
fn test_tree_shape(#[case] text: &str, #[case] rendered: &str) {
    let expression = Expression::parse(text).unwrap();
    assert_eq!(expression.root().to_string(), rendered);
    assert_eq!(expression.text(), text);
}

#[rstest]
#[case("[5/0]")]
#[case("[5%0]")]
#[case("[1 / ($x - 21)]")]
fn test_division_by_zero(#[case] text: &str) {
    assert_eq!(
        eval(text),
        Err(EvalError::DivisionByZero {
            expression: text.to_string()
        })
    );
}

#[rstest]
#[case::empty("[]")]
#[case::blank("[   ]")]
#[case::unclosed_paren("[(1+2]")]
#[case::unopened_paren("[1+2)]")]
#[case::empty_group("[()]")]
#[case::dangling_operator("[1 +]")]
#[case::dangling_prefix("[-]")]
#[case::prefix_in_group("[(-)]")]
#[case::unary_star("[* 3]")]
#[case::binary_tilde("[1 ~ 2]")]
#[case::adjacent_operands("[2 3]")]
#[case::adjacent_group("[2 (3)]")]
#[case::unknown_character("[x]")]
#[case::random_missing_bound("[r 1]")]
#[case::random_extra_bound("[r 1 2 3]")]
#[case::random_not_leading("[1 r 2]")]
#[case::missing_brackets("1 + 2")]
fn test_malformed(#[case] text: &str) {
    let err = Expression::parse(text).unwrap_err();
    assert_eq!(
        err,
        EvalError::Malformed {
            expression: text.to_string()
        }
    );
}

#[test]
fn test_unknown_constant() {
    assert_eq!(
        eval("[!NOPE + 1]"),
        Err(EvalError::UnknownConstant {
            expression: "[!NOPE + 1]".to_string(),
            name: "!NOPE".to_string(),
        })
    );
}

#[rstest]
#[case("[9223372036854775807 + 1]")]
#[case("[99999999999999999999]")]
#[case("[-9223372036854775807 - 2]")]
fn test_overflow(#[case] text: &str) {
    assert!(matches!(eval(text), Err(EvalError::Overflow { .. })), "{text}");
}

#[test]
fn test_error_messages_name_the_expression() {
    assert_eq!(
        eval("[5/0]").unwrap_err().to_string(),
        "Cannot divide by zero, problem in expression [5/0]"
    );
    assert_eq!(
        Expression::parse("[(1]").unwrap_err().to_string(),
        "Invalid expression [(1]"
    );
}

#[test]
fn test_random_range_is_inclusive() {
    let expression = Expression::parse("[r 1 5]").unwrap();
    let mut scope = Scope::new();
    let seen: BTreeSet<i64> = (0..500)
        .map(|_| expression.evaluate(&mut scope).unwrap())
        .collect();

    assert!(seen.iter().all(|value| (1..=5).contains(value)));
    assert!(seen.contains(&1) && seen.contains(&5));
}

#[rstest]
#[case("[r 5 1]", 1, 5)]
#[case("[r -3 (1+1)]", -3, 2)]
#[case("[r $x !W]", 21, 30)]
#[case("[r 4 4]", 4, 4)]
fn test_random_bounds_in_any_order(#[case] text: &str, #[case] low: i64, #[case] high: i64) {
    let expression = Expression::parse(text).unwrap();
    let mut scope = Scope::new().with("$x", 21);
    for _ in 0..50 {
        let value = expression.evaluate(&mut scope).unwrap();
        assert!((low..=high).contains(&value), "{text} gave {value}");
    }
}

#[test]
fn test_statement_level_random() {
    let expression = Expression::random(
        Expression::parse("[10]").unwrap(),
        Expression::parse("[2 * 4]").unwrap(),
    );
    assert_eq!(expression.text(), "r [10] [2 * 4]");

    let mut scope = Scope::new();
    for _ in 0..50 {
        let value = expression.evaluate(&mut scope).unwrap();
        assert!((8..=10).contains(&value));
    }
}

#[test]
fn test_seeded_environments_agree() {
    let expression = Expression::parse("[r 0 1000]").unwrap();
    let mut first = Scope::new();
    let mut second = Scope::new();
    for _ in 0..20 {
        assert_eq!(
            expression.evaluate(&mut first),
            expression.evaluate(&mut second)
        );
    }
}

proptest! {
    #[test]
    fn test_division_floors(a in -10_000i64..10_000, b in -100i64..100) {
        prop_assume!(b != 0);
        let quotient = eval(&format!("[{a} / {b}]")).unwrap();
        let remainder = eval(&format!("[{a} % {b}]")).unwrap();

        prop_assert_eq!(quotient, a.div_euclid(b) - i64::from(b < 0 && a.rem_euclid(b) != 0));
        prop_assert_eq!(b * quotient + remainder, a);
        prop_assert!(remainder == 0 || (remainder < 0) == (b < 0));
    }

    #[test]
    fn test_sum_of_products(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        prop_assert_eq!(eval(&format!("[{a} + {b} * {c}]")), Ok(a + b * c));
        prop_assert_eq!(eval(&format!("[({a} + {b}) * {c}]")), Ok((a + b) * c));
    }

    #[test]
    fn test_parse_never_panics(body in "[-+*/%<>=|&~$!()0-9a-z ]{0,24}") {
        let _ = Expression::parse(&format!("[{body}]"));
    }
}
