use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mockexam_core::answers::{choice_number_for, AnswerStore, ChoiceNumber};
use mockexam_core::model::{Difficulty, Problem};
use mockexam_core::scoring::score;

fn make_problems(n: usize) -> Vec<Problem> {
    (0..n)
        .map(|i| Problem {
            id: format!("gen-bench-{}", i + 1),
            question: format!("문제 {}", i + 1),
            passage: None,
            choices: (1..=5).map(|c| format!("선택지 {c}")).collect(),
            answer: i % 5,
            difficulty: match i % 3 {
                0 => Difficulty::Easy,
                1 => Difficulty::Medium,
                _ => Difficulty::Hard,
            },
            explanation: Some("해설".into()),
            grade: "중학교 1학년".into(),
            topic: "물질의 구성".into(),
        })
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    let problems = make_problems(40);

    let blank = AnswerStore::for_problems(&problems);

    let mut perfect = AnswerStore::for_problems(&problems);
    for p in &problems {
        perfect.set(&p.id, p.correct_choice()).unwrap();
    }

    let mut mixed = AnswerStore::for_problems(&problems);
    for (i, p) in problems.iter().enumerate().filter(|(i, _)| i % 2 == 0) {
        let choice = if i % 4 == 0 {
            choice_number_for(p.answer)
        } else {
            ChoiceNumber::new(1).unwrap()
        };
        mixed.set(&p.id, choice).unwrap();
    }

    group.bench_function("40 problems, blank", |b| {
        b.iter(|| score(black_box(&problems), black_box(&blank)))
    });
    group.bench_function("40 problems, perfect", |b| {
        b.iter(|| score(black_box(&problems), black_box(&perfect)))
    });
    group.bench_function("40 problems, mixed", |b| {
        b.iter(|| score(black_box(&problems), black_box(&mixed)))
    });

    group.finish();
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
