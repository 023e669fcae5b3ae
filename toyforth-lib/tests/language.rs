use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use toyforth_lib::parser::{compile, ParseError};
use toyforth_lib::value::Value;
use toyforth_lib::{run, vm, Error};

fn stack_of(src: &str) -> Vec<Value> {
    let mut out = vec![];
    let (stack, warnings) = run(src, &mut out).unwrap();
    assert!(warnings.is_empty(), "{:?}", warnings);
    stack.to_vec()
}

fn ints(src: &str) -> Vec<i64> {
    stack_of(src).iter().map(|v| v.as_int().unwrap()).collect()
}

fn output_of(src: &str) -> String {
    let mut out = vec![];
    run(src, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn integer_literals() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let n: u32 = rng.gen();
        assert_eq!(ints(&format!("{} ", n)), [n as i64]);
    }
}

#[test]
fn binary_operators() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..200 {
        let a: i64 = rng.gen_range(0..100_000);
        let b: i64 = rng.gen_range(1..100_000);
        assert_eq!(ints(&format!("{} {} +", a, b)), [a + b]);
        assert_eq!(ints(&format!("{} {} -", a, b)), [a - b]);
        assert_eq!(ints(&format!("{} {} *", a, b)), [a * b]);
        assert_eq!(ints(&format!("{} {} /", a, b)), [a / b]);
        assert_eq!(stack_of(&format!("{} {} <", a, b)), [Value::from(a < b)]);
        assert_eq!(stack_of(&format!("{} {} >", a, b)), [Value::from(a > b)]);
    }
}

#[test]
fn stack_words() {
    let stack = stack_of("5 dup");
    assert_eq!(stack, [Value::from(5), Value::from(5)]);
    assert!(stack[0].ptr_eq(&stack[1]));
    assert_eq!(ints("1 2 swap swap"), [1, 2]);
    assert_eq!(ints("1 2 3 rot"), [2, 3, 1]);
    assert_eq!(ints("1 2 over"), [1, 2, 1]);
}

#[test]
fn conditional_execution() {
    assert_eq!(ints("1 2 < [99] if"), [99]);
    assert!(ints("2 1 < [99] if").is_empty());
}

#[test]
fn nested_lists_keep_their_structure() {
    let compiled = compile("[1 [2 3] 4]").unwrap();
    let top = compiled.program.as_list().unwrap().get(0).unwrap();
    let elems = top.as_list().unwrap().to_vec();
    assert_eq!(elems.len(), 3);
    assert_eq!(elems[1].as_list().unwrap().len(), 2);

    assert_eq!(
        output_of("[1 [2 3] 4] print"),
        "[\n  1\n  [\n    2\n    3\n  ]\n  4\n]\n"
    );
}

#[test]
fn malformed_number_is_skipped() {
    let mut out = vec![];
    let (stack, warnings) = run("12x 3 ", &mut out).unwrap();
    assert_eq!(stack.to_vec(), [Value::from(3)]);
    assert!(matches!(warnings[..], [ParseError::MalformedNumber { .. }]));
}

#[test]
fn unbalanced_list_is_fatal() {
    let mut out = vec![];
    let err = run("[1 2", &mut out).unwrap_err();
    assert!(matches!(
        err,
        Error::Parse(ParseError::UnterminatedList { .. })
    ));
    assert_eq!(err.heading(), "Parse error");
}

#[test]
fn runtime_errors_stop_execution() {
    let mut out = vec![];
    let err = run("1 print nope 2 print", &mut out).unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(vm::Error::UnrecognizedSymbol { .. })
    ));
    assert_eq!(out, b"1\n");
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Push(i64),
    Dup,
    Swap,
    Drop,
    Print,
}

fn random_steps(rng: &mut StdRng) -> Vec<Step> {
    let mut depth = 0;
    let len = rng.gen_range(1..60);
    let mut steps = vec![];
    while steps.len() < len {
        let step = match rng.gen_range(0..5) {
            0 => Step::Push(rng.gen_range(0..1000)),
            1 if depth >= 1 => Step::Dup,
            2 if depth >= 2 => Step::Swap,
            3 if depth >= 1 => Step::Drop,
            4 if depth >= 1 => Step::Print,
            _ => continue,
        };
        depth = match step {
            Step::Push(_) | Step::Dup => depth + 1,
            Step::Swap => depth,
            Step::Drop | Step::Print => depth - 1,
        };
        steps.push(step);
    }
    steps
}

/// runs the steps on a plain Vec, returns the final stack and the printed lines
fn model(steps: &[Step]) -> (Vec<i64>, String) {
    let mut stack = vec![];
    let mut out = String::new();
    for step in steps {
        match *step {
            Step::Push(n) => stack.push(n),
            Step::Dup => stack.push(*stack.last().unwrap()),
            Step::Swap => {
                let n = stack.len();
                stack.swap(n - 1, n - 2);
            }
            Step::Drop => {
                stack.pop();
            }
            Step::Print => out.push_str(&format!("{}\n", stack.pop().unwrap())),
        }
    }
    (stack, out)
}

fn source(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| match s {
            Step::Push(n) => format!("{} ", n),
            Step::Dup => "dup ".into(),
            Step::Swap => "swap ".into(),
            Step::Drop => "drop ".into(),
            Step::Print => "print ".into(),
        })
        .collect()
}

#[test]
fn reference_counts_stay_balanced() {
    let mut rng = StdRng::seed_from_u64(0x70f0);
    for _ in 0..1000 {
        let steps = random_steps(&mut rng);
        let (expected_stack, expected_out) = model(&steps);

        let compiled = compile(source(&steps)).unwrap();
        assert!(compiled.warnings.is_empty());
        let weak: Vec<_> = compiled
            .program
            .as_list()
            .unwrap()
            .to_vec()
            .iter()
            .map(|v| v.downgrade())
            .collect();

        let mut out = vec![];
        let stack = vm::execute(&compiled.program, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected_out);
        drop(compiled);

        let values = stack.to_vec();
        let found: Vec<_> = values.iter().map(|v| v.as_int().unwrap()).collect();
        assert_eq!(found, expected_stack);
        // with the program gone, every handle is either a stack slot or in `values`
        for v in &values {
            let slots = values.iter().filter(|other| other.ptr_eq(v)).count();
            assert_eq!(v.refcount(), 2 * slots);
        }

        drop(values);
        drop(stack);
        assert!(weak.iter().all(|w| w.upgrade().is_none()));
    }
}
