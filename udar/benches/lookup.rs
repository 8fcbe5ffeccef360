//! 索引の構築、検索、読み込みのベンチマーク
//!
//! 合成した語形から索引を構築し、単語の検索、索引ファイルの読み込み、
//! テキストの注釈付けの速度を計測します。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use tempfile::TempDir;
use udar::text::StringText;
use udar::{Analyzer, Dictionary, FormIndexBuilder};

const STEMS: [&str; 8] = ["ЗАМ", "МАМ", "РАМ", "ДОМ", "КОТ", "ЛЕС", "СТОЛ", "ГОРОД"];
const ENDINGS: [&str; 6] = ["", "А", "У", "ОМ", "Е", "АМИ"];
const INFIXES: [&str; 4] = ["", "ИК", "ОЧК", "ЕНЬК"];

fn words() -> Vec<String> {
    let mut words = vec![];
    for prefix in ["", "ПО", "ЗА", "ПЕРЕ", "НЕДО"] {
        for stem in STEMS {
            for infix in INFIXES {
                for ending in ENDINGS {
                    words.push(format!("{prefix}{stem}{infix}{ending}"));
                }
            }
        }
    }
    words
}

fn builder(words: &[String]) -> FormIndexBuilder {
    let mut b = FormIndexBuilder::new();
    for (i, w) in words.iter().enumerate() {
        let accent = u8::try_from(i % 3).unwrap();
        b.add(w, accent, u32::try_from(i % 40).unwrap());
        if i % 7 == 0 {
            b.add(w, accent + 1, 1);
        }
    }
    b
}

struct BencherContext {
    _temp_dir: TempDir,
    index_path: PathBuf,
    words: Vec<String>,
}

impl BencherContext {
    fn new() -> Self {
        let words = words();
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let index_path = temp_dir.path().join("forms.udar");
        let dict = Dictionary::from_index(builder(&words).build().unwrap());
        let mut wtr = BufWriter::new(File::create(&index_path).unwrap());
        dict.write(&mut wtr).unwrap();
        wtr.flush().unwrap();
        Self {
            _temp_dir: temp_dir,
            index_path,
            words,
        }
    }
}

fn bench_lookup(c: &mut Criterion) {
    let ctx = BencherContext::new();
    let mut group = c.benchmark_group("udar");

    group.sample_size(20);
    group.bench_function("build", |b| {
        b.iter(|| std::hint::black_box(builder(&ctx.words).build().unwrap()))
    });

    group.bench_function("from_path", |b| {
        b.iter(|| std::hint::black_box(Dictionary::from_path(&ctx.index_path).unwrap()))
    });

    let analyzer = Analyzer::new(Dictionary::from_path(&ctx.index_path).unwrap());
    group.sample_size(100);
    group.throughput(Throughput::Elements(ctx.words.len() as u64));
    group.bench_function("lookup", |b| {
        b.iter(|| {
            for w in &ctx.words {
                std::hint::black_box(analyzer.lookup(w).unwrap());
            }
        })
    });

    let sentence = "Мама мыла раму, а кот сидел в доме. Заммы пошли в лес!\n";
    let body = sentence.repeat(200);
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("report", |b| {
        b.iter(|| {
            let mut text = StringText::new(&body);
            std::hint::black_box(analyzer.report(&mut text).unwrap())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
