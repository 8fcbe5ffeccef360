//! 辞書ソース（MRD形式）の読み込み
//!
//! MRDファイルは次の5つのセクションがこの順に並んだテキストです。
//! 各セクションはレコード数を表す10進数の行で始まり、その数だけレコード行が続きます。
//!
//! 1. 屈折モデル: `%<語尾>*<アンコード>[*<接頭辞>]`の繰り返し
//! 2. アクセントモデル: `;`区切りのアクセント位置
//! 3. セッション: `<ユーザー名>;<開始日時>;<終了日時>`
//! 4. 接頭辞集合: `,`区切りの接頭辞
//! 5. レンマ: `<語幹> <屈折モデル> <アクセントモデル> <セッション> <アンコード|-> <接頭辞集合|->`
//!
//! 読み込みは最初のエラーで中断され、部分的に読み込まれたソースは返されません。

mod model;
mod stats;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::Lines;

use crate::errors::{Result, UdarError};
use crate::gramtab::Gramtab;
use crate::utils::split_fields;

pub use crate::dictionary::source::model::{
    AccentModel, Flexion, FlexionModel, Lemma, PrefixSet, Session, WordForm,
};
pub use crate::dictionary::source::stats::{FormStats, SourceStats};

const EMPTY_MARKER: &str = "-";
const EMPTY_BASE: &str = "#";
const ANCODE_LEN: usize = 2;

/// 読み込まれた辞書ソース
#[derive(Debug, Clone, Default)]
pub struct MrdSource {
    flexion_models: Vec<FlexionModel>,
    accent_models: Vec<AccentModel>,
    sessions: Vec<Session>,
    prefix_sets: Vec<PrefixSet>,
    lemmas: Vec<Lemma>,
    expand_prefix_sets: bool,
}

impl MrdSource {
    /// リーダーから辞書ソースを読み込みます。
    ///
    /// 屈折モデルとレンマのアンコードはグラムタブの序数に解決され、
    /// 同時にグラムタブの使用頻度が数えられます。
    ///
    /// # 引数
    ///
    /// * `rdr` - MRDファイルのリーダー
    /// * `gramtab` - アンコードを解決するグラムタブ
    ///
    /// # エラー
    ///
    /// 以下の場合に[`UdarError`]を返します。
    ///
    /// - レコード数の行が無い、または数値でない場合
    /// - レコード数を満たす前に入力が終わった場合
    /// - レコードの形式が不正な場合
    /// - グラムタブに無いアンコードが使われている場合
    /// - 入力がUTF-8として不正な場合
    pub fn from_reader<R>(mut rdr: R, gramtab: &mut Gramtab) -> Result<Self>
    where
        R: Read,
    {
        let mut buf = vec![];
        rdr.read_to_end(&mut buf)?;
        let text = std::str::from_utf8(&buf)
            .map_err(|e| UdarError::invalid_format("mrd", e.to_string()))?;

        let mut lines = SectionReader {
            lines: text.lines(),
            line_no: 0,
        };
        let mut source = Self::default();

        lines.read_section("flexion models", |line, line_no| {
            let model = parse_flexion_model(line, line_no, gramtab)?;
            source.flexion_models.push(model);
            Ok(())
        })?;
        lines.read_section("accent models", |line, line_no| {
            source.accent_models.push(parse_accent_model(line, line_no)?);
            Ok(())
        })?;
        lines.read_section("sessions", |line, line_no| {
            source.sessions.push(parse_session(line, line_no)?);
            Ok(())
        })?;
        lines.read_section("prefix sets", |line, _| {
            source.prefix_sets.push(parse_prefix_set(line));
            Ok(())
        })?;
        lines.read_section("lemmas", |line, line_no| {
            source.lemmas.push(parse_lemma(line, line_no, gramtab)?);
            Ok(())
        })?;

        log::info!(
            "[udar] loaded {} lemmas, {} flexion models, {} accent models",
            source.lemmas.len(),
            source.flexion_models.len(),
            source.accent_models.len(),
        );
        Ok(source)
    }

    /// ファイルパスから辞書ソースを読み込みます。
    ///
    /// # エラー
    ///
    /// ファイルを開けない場合、または[`MrdSource::from_reader`]が失敗する場合にエラーを返します。
    pub fn from_path<P>(path: P, gramtab: &mut Gramtab) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Self::from_reader(File::open(path)?, gramtab)
    }

    /// 接頭辞集合による語形の展開を有効にするかどうかを設定します。
    ///
    /// 有効にすると、[`MrdSource::all_forms`]は接頭辞集合を持つレンマについて、
    /// 集合内の接頭辞ごとに語形をもう一度生成します。デフォルトは`false`です。
    pub fn expand_prefix_sets(mut self, yes: bool) -> Self {
        self.expand_prefix_sets = yes;
        self
    }

    #[inline(always)]
    pub fn flexion_models(&self) -> &[FlexionModel] {
        &self.flexion_models
    }

    #[inline(always)]
    pub fn accent_models(&self) -> &[AccentModel] {
        &self.accent_models
    }

    #[inline(always)]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    #[inline(always)]
    pub fn prefix_sets(&self) -> &[PrefixSet] {
        &self.prefix_sets
    }

    #[inline(always)]
    pub fn lemmas(&self) -> &[Lemma] {
        &self.lemmas
    }

    /// 指定した語幹を持つレンマを`(位置, レンマ)`の組として返します。
    pub fn lemmas_by_base<'a>(
        &'a self,
        base: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Lemma)> + 'a {
        self.lemmas
            .iter()
            .enumerate()
            .filter(move |(_, l)| l.base == base)
    }

    /// 1つのレンマの語形を、指定した接頭辞を付けて列挙します。
    ///
    /// # 引数
    ///
    /// * `lemma` - レンマの位置
    /// * `prefix` - 語形の先頭に付ける接頭辞
    ///
    /// # エラー
    ///
    /// レンマの位置、またはレンマが参照するモデルの位置が範囲外の場合、
    /// アクセントモデルの長さが屈折モデルと一致しない場合に
    /// [`UdarError::OutOfRange`]を返します。
    pub fn lemma_forms<'a>(&'a self, lemma: usize, prefix: &'a str) -> Result<LemmaForms<'a>> {
        let l = self
            .lemmas
            .get(lemma)
            .ok_or_else(|| UdarError::out_of_range("lemma", lemma, self.lemmas.len(), ""))?;
        let context = || format!("lemma {} ({:?})", lemma, l.base);
        let flexions = self
            .flexion_models
            .get(l.flexion_model)
            .ok_or_else(|| {
                UdarError::out_of_range(
                    "flexion model",
                    l.flexion_model,
                    self.flexion_models.len(),
                    context(),
                )
            })?
            .flexions();
        let accents = self
            .accent_models
            .get(l.accent_model)
            .ok_or_else(|| {
                UdarError::out_of_range(
                    "accent model",
                    l.accent_model,
                    self.accent_models.len(),
                    context(),
                )
            })?
            .accents();
        if accents.len() != flexions.len() {
            return Err(UdarError::out_of_range(
                "accent model entry",
                flexions.len(),
                accents.len(),
                format!(
                    "{}: accent model {} does not cover flexion model {}",
                    context(),
                    l.accent_model,
                    l.flexion_model
                ),
            ));
        }
        Ok(LemmaForms {
            lemma: l,
            flexions: flexions.iter(),
            accents: accents.iter(),
            prefix,
        })
    }

    /// レンマが参照する接頭辞集合を返します。
    ///
    /// # エラー
    ///
    /// 接頭辞集合の位置が範囲外の場合に[`UdarError::OutOfRange`]を返します。
    pub fn prefix_set_of(&self, lemma: usize) -> Result<Option<&PrefixSet>> {
        let l = self
            .lemmas
            .get(lemma)
            .ok_or_else(|| UdarError::out_of_range("lemma", lemma, self.lemmas.len(), ""))?;
        let Some(i) = l.prefix_set else {
            return Ok(None);
        };
        self.prefix_sets.get(i).map(Some).ok_or_else(|| {
            UdarError::out_of_range(
                "prefix set",
                i,
                self.prefix_sets.len(),
                format!("lemma {} ({:?})", lemma, l.base),
            )
        })
    }

    /// すべてのレンマの語形を順に列挙します。
    ///
    /// 列挙は遅延して行われ、呼び出すたびに先頭からやり直せます。
    /// 参照が不正なレンマに達するとエラーを1つ返し、それ以降は何も返しません。
    pub fn all_forms(&self) -> AllForms<'_> {
        AllForms {
            source: self,
            next_lemma: 0,
            current_lemma: 0,
            current: None,
            pending_prefixes: Default::default(),
            failed: false,
        }
    }
}

struct SectionReader<'a> {
    lines: Lines<'a>,
    line_no: usize,
}

impl<'a> SectionReader<'a> {
    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line)
    }

    fn read_section<F>(&mut self, name: &str, mut parse: F) -> Result<()>
    where
        F: FnMut(&str, usize) -> Result<()>,
    {
        let Some(header) = self.next_line() else {
            let msg = format!("{}: expected the number of records, found end of input", name);
            return Err(UdarError::invalid_format("mrd", msg));
        };
        let count: usize = header.trim().parse().map_err(|_| {
            let msg = format!(
                "line {}: {}: expected the number of records, found {:?}",
                self.line_no, name, header
            );
            UdarError::invalid_format("mrd", msg)
        })?;
        for i in 0..count {
            let Some(line) = self.next_line() else {
                let msg = format!(
                    "{}: expected {} records, found end of input after {}",
                    name, count, i
                );
                return Err(UdarError::invalid_format("mrd", msg));
            };
            let line_no = self.line_no;
            parse(line, line_no)?;
        }
        Ok(())
    }
}

fn format_error(line_no: usize, msg: String) -> UdarError {
    UdarError::invalid_format("mrd", format!("line {}: {}", line_no, msg))
}

fn parse_flexion_model(line: &str, line_no: usize, gramtab: &mut Gramtab) -> Result<FlexionModel> {
    let mut model = FlexionModel::default();
    for block in split_fields(line.trim_end(), '%') {
        let mut parts = block.split('*');
        let suffix = parts.next().unwrap_or_default();
        let Some(marker) = parts.next() else {
            return Err(format_error(
                line_no,
                format!("flexion {:?} has no ancode", block),
            ));
        };
        let ancode: String = marker.chars().take(ANCODE_LEN).collect();
        if ancode.chars().count() < ANCODE_LEN {
            return Err(format_error(
                line_no,
                format!("flexion {:?} has a short ancode", block),
            ));
        }
        let ancode_ordinal = gramtab.register(&ancode)?;
        let prefix = parts.next().unwrap_or_default();
        model.flexions.push(Flexion {
            suffix: suffix.to_string(),
            prefix: prefix.to_string(),
            ancode,
            ancode_ordinal,
        });
    }
    Ok(model)
}

fn parse_accent_model(line: &str, line_no: usize) -> Result<AccentModel> {
    let mut model = AccentModel::default();
    for item in split_fields(line.trim_end(), ';') {
        let accent: u8 = item.trim().parse().map_err(|_| {
            format_error(line_no, format!("invalid accent position {:?}", item))
        })?;
        model.accents.push(accent);
    }
    Ok(model)
}

fn parse_session(line: &str, line_no: usize) -> Result<Session> {
    let parts: Vec<&str> = line.split(';').collect();
    if parts.len() < 3 {
        return Err(format_error(
            line_no,
            format!("a session must have three fields, {:?}", line),
        ));
    }
    Ok(Session {
        user: parts[0].to_string(),
        start: parts[1].to_string(),
        end: parts[2].to_string(),
    })
}

fn parse_prefix_set(line: &str) -> PrefixSet {
    PrefixSet {
        prefixes: split_fields(line.trim_end(), ',')
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

fn parse_lemma(line: &str, line_no: usize, gramtab: &mut Gramtab) -> Result<Lemma> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 6 {
        return Err(format_error(
            line_no,
            format!("a lemma must have six fields, {:?}", line),
        ));
    }
    let index = |i: usize| -> Result<usize> {
        parts[i].parse().map_err(|_| {
            format_error(line_no, format!("invalid index {:?} in {:?}", parts[i], line))
        })
    };
    let base = if parts[0] == EMPTY_BASE { "" } else { parts[0] };
    let type_ancode = if parts[4] == EMPTY_MARKER {
        None
    } else {
        let ordinal = gramtab.register(parts[4])?;
        Some((parts[4].to_string(), ordinal))
    };
    let prefix_set = if parts[5] == EMPTY_MARKER {
        None
    } else {
        Some(index(5)?)
    };
    Ok(Lemma {
        base: base.to_string(),
        flexion_model: index(1)?,
        accent_model: index(2)?,
        session: index(3)?,
        type_ancode,
        prefix_set,
    })
}

/// 1つのレンマの語形を列挙するイテレータ
pub struct LemmaForms<'a> {
    lemma: &'a Lemma,
    flexions: std::slice::Iter<'a, Flexion>,
    accents: std::slice::Iter<'a, u8>,
    prefix: &'a str,
}

impl<'a> Iterator for LemmaForms<'a> {
    type Item = WordForm<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let flexion = self.flexions.next()?;
        let &accent = self.accents.next()?;
        Some(WordForm {
            lemma: self.lemma,
            flexion,
            prefix: self.prefix,
            accent,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.flexions.size_hint()
    }
}

/// すべてのレンマの語形を列挙するイテレータ
///
/// [`MrdSource::all_forms`]で作成されます。
pub struct AllForms<'a> {
    source: &'a MrdSource,
    next_lemma: usize,
    current_lemma: usize,
    current: Option<LemmaForms<'a>>,
    pending_prefixes: std::slice::Iter<'a, String>,
    failed: bool,
}

impl<'a> AllForms<'a> {
    fn fail(&mut self, e: UdarError) -> Option<Result<WordForm<'a>>> {
        self.failed = true;
        self.current = None;
        Some(Err(e))
    }
}

impl<'a> Iterator for AllForms<'a> {
    type Item = Result<WordForm<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(form) = self.current.as_mut().and_then(Iterator::next) {
                return Some(Ok(form));
            }
            if let Some(prefix) = self.pending_prefixes.next() {
                match self.source.lemma_forms(self.current_lemma, prefix) {
                    Ok(forms) => self.current = Some(forms),
                    Err(e) => return self.fail(e),
                }
                continue;
            }
            if self.next_lemma >= self.source.lemmas.len() {
                self.current = None;
                return None;
            }
            self.current_lemma = self.next_lemma;
            self.next_lemma += 1;
            match self.source.lemma_forms(self.current_lemma, "") {
                Ok(forms) => self.current = Some(forms),
                Err(e) => return self.fail(e),
            }
            if self.source.expand_prefix_sets {
                match self.source.prefix_set_of(self.current_lemma) {
                    Ok(Some(set)) => self.pending_prefixes = set.prefixes.iter(),
                    Ok(None) => (),
                    Err(e) => return self.fail(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAMTAB: &str = "\
аа A С мр,ед,им
аб A С мр,ед,рд
ав A С мр,ед,дт
Фа a С мр
";

    const MRD: &str = "\
2
%*аа%А*аб%У*ав
%ОЙ*аа*ПО
2
1;0;0
255
1
user;2001-01-01 10:00:00;2001-01-02 11:00:00
1
ПЕРЕ,ЗА
3
ДОМ 0 0 0 Фа 0
СТОЛ 0 0 0 - -
ДОМ 1 1 0 - -
";

    fn load(mrd: &str) -> Result<(MrdSource, Gramtab)> {
        let mut gramtab = Gramtab::from_reader(GRAMTAB.as_bytes())?;
        let source = MrdSource::from_reader(mrd.as_bytes(), &mut gramtab)?;
        Ok((source, gramtab))
    }

    #[test]
    fn test_sections() {
        let (source, gramtab) = load(MRD).unwrap();
        assert_eq!(source.flexion_models().len(), 2);
        assert_eq!(source.accent_models().len(), 2);
        assert_eq!(source.sessions().len(), 1);
        assert_eq!(source.sessions()[0].user(), "user");
        assert_eq!(source.prefix_sets()[0].prefixes(), &["ПЕРЕ", "ЗА"]);
        assert_eq!(source.lemmas().len(), 3);

        let f = &source.flexion_models()[1].flexions()[0];
        assert_eq!(f.suffix(), "ОЙ");
        assert_eq!(f.prefix(), "ПО");
        assert_eq!(f.ancode(), "аа");

        let lemma = &source.lemmas()[0];
        assert_eq!(lemma.type_ancode(), Some("Фа"));
        assert_eq!(lemma.type_ancode_ordinal(), Some(3));
        assert_eq!(lemma.prefix_set(), Some(0));
        assert_eq!(source.lemmas()[1].prefix_set(), None);

        // Counted once per flexion record, not per lemma.
        assert_eq!(gramtab.frequency("аа"), Some(2));
        assert_eq!(gramtab.frequency("аб"), Some(1));
        assert_eq!(gramtab.frequency("Фа"), Some(1));
    }

    #[test]
    fn test_all_forms() {
        let (source, _) = load(MRD).unwrap();
        let forms: Vec<(String, u8, String)> = source
            .all_forms()
            .map(|f| {
                let f = f.unwrap();
                (f.surface(), f.accent(), f.ancode().to_string())
            })
            .collect();
        assert_eq!(
            forms,
            vec![
                ("ДОМ".to_string(), 1, "аа".to_string()),
                ("ДОМА".to_string(), 0, "аб".to_string()),
                ("ДОМУ".to_string(), 0, "ав".to_string()),
                ("СТОЛ".to_string(), 1, "аа".to_string()),
                ("СТОЛА".to_string(), 0, "аб".to_string()),
                ("СТОЛУ".to_string(), 0, "ав".to_string()),
                ("ПОДОМОЙ".to_string(), 255, "аа".to_string()),
            ]
        );
        // Restartable.
        assert_eq!(source.all_forms().count(), 7);
    }

    #[test]
    fn test_expand_prefix_sets() {
        let (source, _) = load(MRD).unwrap();
        let source = source.expand_prefix_sets(true);
        let surfaces: Vec<String> = source
            .all_forms()
            .map(|f| f.unwrap().surface())
            .collect();
        assert_eq!(surfaces.len(), 13);
        assert_eq!(&surfaces[..6], &["ДОМ", "ДОМА", "ДОМУ", "ПЕРЕДОМ", "ПЕРЕДОМА", "ПЕРЕДОМУ"]);
        assert_eq!(&surfaces[6..9], &["ЗАДОМ", "ЗАДОМА", "ЗАДОМУ"]);
    }

    #[test]
    fn test_lemmas_by_base() {
        let (source, _) = load(MRD).unwrap();
        let found: Vec<usize> = source.lemmas_by_base("ДОМ").map(|(i, _)| i).collect();
        assert_eq!(found, vec![0, 2]);
        let forms: Vec<String> = source
            .lemma_forms(2, "")
            .unwrap()
            .map(|f| f.to_string())
            .collect();
        assert_eq!(forms, vec!["ПОДОМОЙ"]);
    }

    #[test]
    fn test_empty_base() {
        let mrd = "1\n%ОН*аа\n1\n0\n0\n0\n1\n# 0 0 0 - -\n";
        let (source, _) = load(mrd).unwrap();
        assert_eq!(source.lemmas()[0].base(), "");
        let form = source.all_forms().next().unwrap().unwrap();
        assert_eq!(form.surface(), "ОН");
    }

    #[test]
    fn test_crlf() {
        let mrd = MRD.replace('\n', "\r\n");
        let (source, _) = load(&mrd).unwrap();
        assert_eq!(source.all_forms().count(), 7);
        assert_eq!(source.prefix_sets()[0].prefixes(), &["ПЕРЕ", "ЗА"]);
    }

    #[test]
    fn test_non_numeric_count() {
        let result = load("x\n");
        assert!(matches!(result, Err(UdarError::InvalidFormat(_))));
    }

    #[test]
    fn test_errors_name_the_line() {
        let err = load("0\n0\nabc\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("sessions"), "{msg}");

        let err = load("0\n1\n1;256\n").unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn test_missing_count() {
        let result = load("0\n0\n0\n0\n");
        assert!(matches!(result, Err(UdarError::InvalidFormat(_))));
    }

    #[test]
    fn test_truncated_section() {
        let result = load("2\n%*аа\n");
        assert!(matches!(result, Err(UdarError::InvalidFormat(_))));
    }

    #[test]
    fn test_unknown_ancode() {
        let result = load("1\n%*яя\n0\n0\n0\n0\n");
        assert!(matches!(result, Err(UdarError::NotFound(_))));
    }

    #[test]
    fn test_invalid_accent() {
        let result = load("0\n1\n1;256\n0\n0\n0\n");
        assert!(matches!(result, Err(UdarError::InvalidFormat(_))));
    }

    #[test]
    fn test_out_of_range_model() {
        let mrd = "1\n%*аа\n1\n0\n0\n0\n2\nДОМ 0 0 0 - -\nКОТ 5 0 0 - -\n";
        let (source, _) = load(mrd).unwrap();
        let results: Vec<_> = source.all_forms().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(UdarError::OutOfRange(e)) => assert_eq!(e.index(), 5),
            _ => panic!("expected an out-of-range error"),
        }
    }

    #[test]
    fn test_accent_model_mismatch() {
        let mrd = "1\n%*аа%А*аб\n1\n0\n0\n0\n1\nДОМ 0 0 0 - -\n";
        let (source, _) = load(mrd).unwrap();
        assert!(matches!(
            source.all_forms().next(),
            Some(Err(UdarError::OutOfRange(_)))
        ));
    }
}
