use std::cell::OnceCell;
use std::rc::Rc;

use vigil::Validate;
use vigil::Validator;

#[derive(Validate)]
struct Chain {
    #[validate(required)]
    label: Option<String>,

    #[validate(valid)]
    next: OnceCell<Rc<Chain>>,
}

#[test]
fn test_self_referencing_object_terminates() {
    let node = Rc::new(Chain {
        label: None,
        next: OnceCell::new(),
    });
    let _ = node.next.set(Rc::clone(&node));

    let validator = Validator::new();
    let violations = validator.validate(node.as_ref()).unwrap();

    // The node's constraints are reported exactly once.
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "label");
}

#[test]
fn test_two_node_cycle_terminates() {
    let a = Rc::new(Chain {
        label: None,
        next: OnceCell::new(),
    });
    let b = Rc::new(Chain {
        label: Some("b".to_string()),
        next: OnceCell::new(),
    });
    let _ = a.next.set(Rc::clone(&b));
    let _ = b.next.set(Rc::clone(&a));

    let validator = Validator::new();
    let violations = validator.validate(a.as_ref()).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "label");
}

#[derive(Validate)]
struct Pair {
    #[validate(valid)]
    left: Option<Rc<Chain>>,

    #[validate(valid)]
    right: Option<Rc<Chain>>,
}

#[test]
fn test_shared_sub_object_is_validated_once() {
    let shared = Rc::new(Chain {
        label: None,
        next: OnceCell::new(),
    });
    let pair = Pair {
        left: Some(Rc::clone(&shared)),
        right: Some(Rc::clone(&shared)),
    };

    let validator = Validator::new();
    let violations = validator.validate(&pair).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "left.label");
}

#[test]
fn test_distinct_but_equal_sub_objects_are_validated_independently() {
    let pair = Pair {
        left: Some(Rc::new(Chain {
            label: None,
            next: OnceCell::new(),
        })),
        right: Some(Rc::new(Chain {
            label: None,
            next: OnceCell::new(),
        })),
    };

    let validator = Validator::new();
    let violations = validator.validate(&pair).unwrap();
    let paths: Vec<&str> = violations
        .iter()
        .map(|violation| violation.path.as_str())
        .collect();
    assert_eq!(paths, vec!["left.label", "right.label"]);
}

#[derive(Validate)]
struct Cell {
    #[validate(required)]
    value: Option<i64>,
}

#[derive(Validate)]
struct Matrix {
    #[validate(valid)]
    rows: Vec<Vec<Cell>>,
}

#[test]
fn test_nested_collections_index_every_level() {
    let matrix = Matrix {
        rows: vec![
            vec![Cell { value: Some(1) }, Cell { value: Some(2) }],
            vec![Cell { value: Some(3) }, Cell { value: None }],
        ],
    };

    let validator = Validator::new();
    let violations = validator.validate(&matrix).unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, "rows.1.1.value");
}

#[test]
fn test_validation_is_idempotent() {
    let node = Chain {
        label: None,
        next: OnceCell::new(),
    };

    let validator = Validator::new();
    let first = validator.validate(&node).unwrap();
    let second = validator.validate(&node).unwrap();
    assert_eq!(first, second);
}

#[derive(Validate)]
struct Labeled {
    #[validate(required)]
    label: Option<String>,
}

#[test]
fn test_concurrent_validation_shares_one_validator() {
    let validator = Validator::new();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let item = Labeled { label: None };
                let violations = validator.validate(&item).unwrap();
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].path, "label");
            });
        }
    });
}
