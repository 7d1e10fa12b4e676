// End-to-end flows through the public API with file-backed storage and history

use dataman::commands::{execute, Cli, Console};
use dataman::services::{GeneratorConfig, JsonStorage, SqliteStorage};
use dataman::{
    open_storage, DatamanError, Difficulty, DomainError, Operations, Operator, Problem, ProblemSet,
    ProblemSetStore, StorageKind, UserHistory,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::path::Path;

fn open_ops(dir: &Path, kind: StorageKind) -> Operations {
    let file = match kind {
        StorageKind::Json => "dataman.json",
        StorageKind::Sqlite => "dataman.db",
    };
    let storage = open_storage(kind, &dir.join(file)).unwrap();
    let history = UserHistory::open(dir.join("user_history.json")).unwrap();
    Operations::new(storage, history)
}

#[test]
fn arithmetic_scenarios() {
    let sum = Problem::new(2, Operator::Add, 2).unwrap();
    assert_eq!(sum.solve().unwrap(), 4);
    assert!(sum.check_answer(4).unwrap());
    assert!(!sum.check_answer(5).unwrap());
    assert_eq!(sum.to_string(), "2 + 2 = 4");
    assert_eq!(sum.prompt(), "2 + 2 = ");

    assert_eq!(Problem::new(7, Operator::Divide, 2).unwrap().solve().unwrap(), 3);
    assert_eq!(Problem::new(-7, Operator::Divide, 2).unwrap().solve().unwrap(), -3);

    assert!(matches!(
        Problem::new(7, Operator::Divide, 0),
        Err(DatamanError::Domain(DomainError::DivisionByZero { dividend: 7 }))
    ));
    let stored = Problem::with_answer(7, Operator::Divide, 0, 0);
    assert!(matches!(stored.check_answer(0), Err(DatamanError::Domain(_))));

    assert!(matches!("%".parse::<Operator>(), Err(DatamanError::Validation(_))));
}

#[test]
fn every_operator_accepts_its_own_solution() {
    for op in Operator::ALL {
        for (a, b) in [(12, 4), (-9, 3), (0, 5), (100, -7)] {
            let problem = Problem::new(a, op, b).unwrap();
            let solution = problem.solve().unwrap();
            assert!(problem.check_answer(solution).unwrap(), "{}", problem);
            assert!(!problem.check_answer(solution + 1).unwrap(), "{}", problem);
        }
    }
}

#[test]
fn removing_from_empty_set_is_out_of_range() {
    let mut set = ProblemSet::new("empty", None).unwrap();
    assert!(matches!(
        set.remove(0),
        Err(DatamanError::IndexOutOfRange { index: 0, len: 0 })
    ));
}

#[test]
fn generated_set_matches_request() {
    let config = GeneratorConfig {
        count: 10,
        operators: [Operator::Add, Operator::Subtract].into_iter().collect::<BTreeSet<_>>(),
        min_operand: 1,
        max_operand: 20,
        difficulty: None,
    };
    let mut rng = StdRng::seed_from_u64(2024);
    let set = dataman::services::generate_problem_set("ten", None, &config, &mut rng).unwrap();

    assert_eq!(set.len(), 10);
    for problem in set.iter() {
        assert!(config.operators.contains(&problem.operator()));
        assert!((1..=20).contains(&problem.first()));
        assert!((1..=20).contains(&problem.second()));
        assert_eq!(problem.answer(), problem.solve().unwrap());
        assert!(problem.is_consistent());
    }
    assert_eq!(set.operator_counts().values().sum::<usize>(), 10);
}

#[test]
fn both_backends_round_trip_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ProblemSet::new("ordered", Some("kept in order")).unwrap();
    for (a, op, b) in [(9, Operator::Multiply, 9), (1, Operator::Add, 1), (8, Operator::Divide, 4)] {
        set.add(Problem::new(a, op, b).unwrap());
    }

    let mut json = JsonStorage::open(dir.path().join("sets.json")).unwrap();
    json.save(&set).unwrap();
    assert_eq!(JsonStorage::open(dir.path().join("sets.json")).unwrap().load("ordered").unwrap(), set);

    let mut sqlite = SqliteStorage::open(&dir.path().join("sets.db")).unwrap();
    sqlite.save(&set).unwrap();
    assert_eq!(SqliteStorage::open(&dir.path().join("sets.db")).unwrap().load("ordered").unwrap(), set);
}

#[test]
fn practice_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut ops = open_ops(dir.path(), StorageKind::Sqlite);
        ops.begin_session().unwrap();
        ops.create_problem_set("homework", None).unwrap();
        ops.add_problem(Problem::new(3, Operator::Multiply, 4).unwrap()).unwrap();
        ops.add_problem(Problem::new(10, Operator::Subtract, 15).unwrap()).unwrap();
        assert!(ops.check_answer(0, 12).unwrap());
        assert!(!ops.check_answer(1, 5).unwrap());
        ops.finish_session().unwrap();
    }

    let mut ops = open_ops(dir.path(), StorageKind::Sqlite);
    let set = ops.load_problem_set("homework").unwrap();
    assert_eq!(set.get(0).unwrap().attempt_outcome(), Some(true));
    assert_eq!(set.get(1).unwrap().attempt_outcome(), Some(false));

    let stats = ops.statistics();
    assert_eq!((stats.total, stats.attempted, stats.correct), (2, 2, 1));

    let history = ops.history();
    assert_eq!(history.statistics().total_problems_attempted, 2);
    assert_eq!(history.sessions().len(), 1);
    assert!(history.sessions()[0].end_time.is_some());
    assert_eq!(history.achievements().len(), 2);
}

#[test]
fn console_memory_bank_persists_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut ops = open_ops(dir.path(), StorageKind::Json);

    let mut output = Vec::new();
    Console::new(&mut ops, "2\n1\n12 / 4\n3\n1\n3\n0\n0\n".as_bytes(), &mut output, "bank")
        .with_rng(StdRng::seed_from_u64(0))
        .run()
        .unwrap();
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Memory Bank - bank"));
    assert!(output.contains("Correct!"));

    let reopened = JsonStorage::open(dir.path().join("dataman.json")).unwrap();
    let bank = reopened.load("bank").unwrap();
    assert_eq!(bank.len(), 1);
    assert_eq!(bank.get(0).unwrap().user_answer(), Some(3));
}

#[test]
fn cli_generate_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let mut ops = open_ops(dir.path(), StorageKind::Json);
    let mut rng = StdRng::seed_from_u64(8);

    let cli = Cli::try_parse_from([
        "dataman", "generate", "--name", "hard-mult", "--difficulty", "hard", "-o", "*", "-c", "3",
    ])
    .unwrap();
    let mut out = Vec::new();
    execute(cli.command.unwrap(), &mut ops, &mut out, &mut rng).unwrap();

    let set = ops.storage().load("hard-mult").unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set.difficulty(), Some(Difficulty::Hard));
    assert!(set.iter().all(|p| p.operator() == Operator::Multiply));
}
