//! Context Extractor Module
//!
//! Onsite Packet（XLSX）から正規化済みコンテキストを抽出するモジュール。
//! key-valueシートの固定フィールドマッピング、スケジュールの正規化・
//! フィルタリング、および時刻値の整形を提供します。
//!
//! 抽出は呼び出しごとに完結し、状態を保持しません。個々のフィールドや
//! 時刻値の解決失敗は空文字列／未整形値への縮退にとどまり、行境界を
//! 越えてエラーを伝播させません。

use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets, Xlsx};
use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

use crate::api::SpeakerSelection;
use crate::builder::GeneratorConfig;
use crate::error::SpeakerPacketError;
use crate::security::SecurityConfig;
use crate::types::{EventMetadata, ScheduleRow, SpeakerPacketContext};

/// スケジュールシートに`Speaker`列がない場合に合成される値
const SPEAKER_FALLBACK: &str = "All";

/// スケジュールシートの必須列名（完全一致・大文字小文字を区別）
const TIME_COLUMN: &str = "Time";
const WHAT_COLUMN: &str = "What";
const WHO_COLUMN: &str = "Who";
const SPEAKER_COLUMN: &str = "Speaker";

/// スケジュール行の中間表現
///
/// フィルタリング用のスピーカー値を保持します。時刻セルは整形を
/// フィルタリング後まで遅延させるため、生の`Data`のまま持ちます。
#[derive(Debug, Clone)]
struct ScheduleEntry {
    time: Data,
    what: String,
    who: String,
    speaker: String,
}

/// コンテキスト抽出器
///
/// Onsite Packetの2シート（"Event Details"と"Onsite Schedule"）を読み、
/// テンプレートレンダラーに渡す`SpeakerPacketContext`を構築します。
pub(crate) struct ContextExtractor<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> ContextExtractor<'a> {
    /// 新しい抽出器を生成
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// コンテキストを抽出
    ///
    /// # 引数
    ///
    /// * `input` - Onsite Packetを読み込むためのリーダー（Read + Seek）
    /// * `selection` - スピーカー選択（センチネルの場合はフィルタなし）
    ///
    /// # 戻り値
    ///
    /// * `Ok(SpeakerPacketContext)` - 抽出に成功した場合
    /// * `Err(SpeakerPacketError)` - 必須シート・必須列が欠落している場合
    ///
    /// # 処理フロー
    ///
    /// 1. key-valueシートからイベントメタデータを構築
    /// 2. スケジュールシートを正規化（ヘッダー再掲・空行の除去）
    /// 3. スピーカー選択によるフィルタリング
    /// 4. 残った行の時刻値を整形（失敗時は元値のまま）
    pub fn extract<R: Read + Seek>(
        &self,
        input: R,
        selection: &SpeakerSelection,
    ) -> Result<SpeakerPacketContext, SpeakerPacketError> {
        let mut workbook = open_workbook(input)?;

        let details_range = sheet_range(&mut workbook, &self.config.event_details_sheet)?;
        let schedule_range = sheet_range(&mut workbook, &self.config.schedule_sheet)?;

        let metadata = event_metadata(&details_range);
        let mut entries = schedule_entries(&schedule_range, &self.config.schedule_sheet)?;

        if let Some(name) = selection.selected_name() {
            entries.retain(|entry| retain_for_speaker(&entry.speaker, name));
        }

        let formatter = TimeFormatter;
        let schedule = entries
            .into_iter()
            .map(|entry| ScheduleRow {
                time: formatter.format(&entry.time),
                what: entry.what,
                who: entry.who,
            })
            .collect();

        Ok(SpeakerPacketContext { metadata, schedule })
    }

    /// スケジュールシートからスピーカー名の集合を抽出
    ///
    /// `Speaker`列の値をトリムし、空値を除外し、重複を排除して辞書順で
    /// 返します。`Speaker`列が存在しない場合は`["All"]`を返します。
    /// センチネルの付加は呼び出し側（ファサード）の責務です。
    pub fn speaker_names<R: Read + Seek>(
        &self,
        input: R,
    ) -> Result<Vec<String>, SpeakerPacketError> {
        let mut workbook = open_workbook(input)?;
        let range = sheet_range(&mut workbook, &self.config.schedule_sheet)?;

        let mut rows = range.rows();
        let header = rows.next().ok_or_else(|| SpeakerPacketError::MalformedInput {
            sheet: self.config.schedule_sheet.clone(),
            message: "schedule sheet has no header row".to_string(),
        })?;

        let names: BTreeSet<String> = match find_column(header, SPEAKER_COLUMN) {
            Some(col) => rows
                .filter_map(|row| {
                    let raw = row.get(col).map(data_to_string).unwrap_or_default();
                    let trimmed = raw.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                })
                .collect(),
            None => std::iter::once(SPEAKER_FALLBACK.to_string()).collect(),
        };

        Ok(names.into_iter().collect())
    }
}

/// ワークブックを開く
///
/// 入力全体をメモリに読み込み（サイズ制限を適用）、calamineで開きます。
/// XLSX以外のコンテナは設定エラーとして扱います。
fn open_workbook<R: Read + Seek>(
    mut input: R,
) -> Result<Xlsx<Cursor<Vec<u8>>>, SpeakerPacketError> {
    let security_config = SecurityConfig::default();

    let mut buffer = Vec::new();
    let bytes_read = input.read_to_end(&mut buffer)?;

    if bytes_read as u64 > security_config.max_input_file_size {
        return Err(SpeakerPacketError::SecurityViolation(format!(
            "Input file size exceeds maximum: {} bytes (max: {} bytes)",
            bytes_read, security_config.max_input_file_size
        )));
    }

    let sheets =
        open_workbook_auto_from_rs(Cursor::new(buffer)).map_err(SpeakerPacketError::Parse)?;
    match sheets {
        Sheets::Xlsx(workbook) => Ok(workbook),
        _ => Err(SpeakerPacketError::Config(
            "Only XLSX format is supported".to_string(),
        )),
    }
}

/// シートを取得（欠落時は`MalformedInput`）
fn sheet_range(
    workbook: &mut Xlsx<Cursor<Vec<u8>>>,
    sheet: &str,
) -> Result<Range<Data>, SpeakerPacketError> {
    workbook
        .worksheet_range(sheet)
        .map_err(|e| SpeakerPacketError::MalformedInput {
            sheet: sheet.to_string(),
            message: e.to_string(),
        })
}

/// key-valueシートからイベントメタデータを構築
///
/// ヘッダー行なしとして解釈し、列0をラベル、列1を値とするマッピングを
/// 作ります。各フィールドは候補ラベルのリストを優先順に照合して解決し、
/// どの候補にも一致しない場合は空文字列に縮退します（エラーには
/// なりません）。
fn event_metadata(range: &Range<Data>) -> EventMetadata {
    let mut kv: HashMap<String, String> = HashMap::new();
    for row in range.rows() {
        let label = row.first().map(data_to_string).unwrap_or_default();
        if label.is_empty() {
            continue;
        }
        let value = row.get(1).map(data_to_string).unwrap_or_default();
        kv.insert(label, value);
    }

    EventMetadata {
        event_name: lookup(&kv, &["Event Name"]),
        dates: lookup(&kv, &["Dates"]),
        time: lookup(&kv, &["Time"]),
        location_name: lookup(&kv, &["Location Name"]),
        location_address: lookup(&kv, &["Location Address"]),
        // 流通しているワークブックには"Evenet"という誤記ラベルの版が
        // 存在するため、両方の綴りを受け付ける
        event_audience_details: lookup(
            &kv,
            &["Event Audience Details", "Evenet Audience Details"],
        ),
        expected_attendance: lookup(&kv, &["Expected Attendance"]),
        host_name_1: lookup(&kv, &["Host Name 1"]),
        cell_phone_1: lookup(&kv, &["Cell Phone 1"]),
        host_name_2: lookup(&kv, &["Host Name 2"]),
        cell_phone_2: lookup(&kv, &["Cell Phone 2"]),
        parking_details: lookup(&kv, &["Parking Details"]),
        event_producer_email: lookup(&kv, &["Event Producer Email"]),
        deadline: lookup(&kv, &["Deadline"]),
        stage_layout: lookup(&kv, &["Stage Layout"]),
        design: lookup(&kv, &["Design"]),
    }
}

/// 候補ラベルを優先順に照合（完全一致）
fn lookup(kv: &HashMap<String, String>, candidates: &[&str]) -> String {
    candidates
        .iter()
        .find_map(|label| kv.get(*label).cloned())
        .unwrap_or_default()
}

/// スケジュールシートを正規化して中間表現に変換
///
/// ヘッダー行から必須列（`Time`/`What`/`Who`）の位置を完全一致で解決
/// します。`Time`が空の行、および`Time`がリテラル"Time"の行（シート
/// 途中に再掲されたヘッダー行）は除外します。time/what/whoがすべて
/// 空の行は`Time`空チェックに包含されます。ソース順は保持されます。
fn schedule_entries(
    range: &Range<Data>,
    sheet: &str,
) -> Result<Vec<ScheduleEntry>, SpeakerPacketError> {
    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| SpeakerPacketError::MalformedInput {
        sheet: sheet.to_string(),
        message: "schedule sheet has no header row".to_string(),
    })?;

    let time_col = require_column(header, TIME_COLUMN, sheet)?;
    let what_col = require_column(header, WHAT_COLUMN, sheet)?;
    let who_col = require_column(header, WHO_COLUMN, sheet)?;
    let speaker_col = find_column(header, SPEAKER_COLUMN);

    let mut entries = Vec::new();
    for row in rows {
        let time_cell = row.get(time_col).cloned().unwrap_or(Data::Empty);
        let time_raw = data_to_string(&time_cell);

        if time_raw.is_empty() || time_raw == TIME_COLUMN {
            continue;
        }

        let what = row.get(what_col).map(data_to_string).unwrap_or_default();
        let who = row.get(who_col).map(data_to_string).unwrap_or_default();

        let speaker = match speaker_col {
            Some(col) => row.get(col).map(data_to_string).unwrap_or_default(),
            None => SPEAKER_FALLBACK.to_string(),
        };

        entries.push(ScheduleEntry {
            time: time_cell,
            what,
            who,
            speaker,
        });
    }

    Ok(entries)
}

/// ヘッダー行から列位置を解決（完全一致・大文字小文字を区別）
fn find_column(header: &[Data], name: &str) -> Option<usize> {
    header.iter().position(|cell| data_to_string(cell) == name)
}

/// 必須列の位置を解決（欠落時は`MalformedInput`）
fn require_column(
    header: &[Data],
    name: &str,
    sheet: &str,
) -> Result<usize, SpeakerPacketError> {
    find_column(header, name).ok_or_else(|| SpeakerPacketError::MalformedInput {
        sheet: sheet.to_string(),
        message: format!("required column '{}' not found", name),
    })
}

/// スピーカーフィルタの判定
///
/// スピーカー値（小文字化）が選択名（小文字化）を部分文字列として含む、
/// または"all"を含む場合に行を残します。部分文字列一致のため、"Bob"の
/// 選択は"Bobby"の行にも一致します。この挙動は意図的に保持しています。
fn retain_for_speaker(entry_speaker: &str, selected: &str) -> bool {
    let speaker = entry_speaker.to_lowercase();
    speaker.contains(&selected.to_lowercase()) || speaker.contains("all")
}

/// セル値を文字列に変換（時刻整形の適用前）
pub(crate) fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.clone(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => datetime_serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
        _ => String::new(),
    }
}

/// シリアル日時値を表示用文字列に変換
///
/// 日付部を持つ値はISO形式、時刻のみの値（シリアル値が1未満）は
/// `h:mm AM/PM`で表示します。変換できない値は数値表現のままにします。
fn datetime_serial_to_string(serial: f64) -> String {
    match datetime_from_serial(serial) {
        Some((date, time)) if serial >= 1.0 => {
            if time == NaiveTime::MIN {
                date.format("%Y-%m-%d").to_string()
            } else {
                format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M"))
            }
        }
        Some((_, time)) => TimeFormatter::to_display(time),
        None => serial.to_string(),
    }
}

/// Excelシリアル値を日付と時刻に分解
///
/// 1900年システム（1899年12月30日起算、Excelのうるう年バグを吸収した
/// エポック）として解釈します。
fn datetime_from_serial(serial: f64) -> Option<(NaiveDate, NaiveTime)> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let days = serial.floor() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(days))?;

    let seconds = ((serial - days as f64) * 86_400.0).round() as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds % 86_400, 0)?;

    Some((date, time))
}

/// 時刻フォーマッター
///
/// スケジュール行の時刻値を`h:mm AM/PM`形式（時のゼロ埋めなし）に
/// 整形します。整形に失敗した値は元の表現のまま返します（行単位の
/// 縮退であり、エラーにはなりません）。
#[derive(Debug)]
pub(crate) struct TimeFormatter;

impl TimeFormatter {
    /// 時刻セルを整形
    ///
    /// * 日時型セル: シリアル値の小数部を時刻として解釈
    /// * 文字列セル: `%H:%M:%S`としてパースを試行
    /// * それ以外: 文字列化した値をそのまま返す
    pub fn format(&self, cell: &Data) -> String {
        match cell {
            Data::DateTime(dt) => {
                Self::from_serial(dt.as_f64()).unwrap_or_else(|| data_to_string(cell))
            }
            Data::String(s) => Self::from_clock_string(s).unwrap_or_else(|| s.clone()),
            other => data_to_string(other),
        }
    }

    fn from_serial(serial: f64) -> Option<String> {
        let (_, time) = datetime_from_serial(serial)?;
        Some(Self::to_display(time))
    }

    fn from_clock_string(s: &str) -> Option<String> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M:%S").ok()?;
        Some(Self::to_display(time))
    }

    /// 12時間表記へ変換（時のゼロ埋めなし）
    fn to_display(time: NaiveTime) -> String {
        let (is_pm, hour) = time.hour12();
        format!(
            "{}:{:02} {}",
            hour,
            time.minute(),
            if is_pm { "PM" } else { "AM" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // TimeFormatter のテスト
    #[test]
    fn test_time_format_clock_string_morning() {
        let formatter = TimeFormatter;
        assert_eq!(
            formatter.format(&Data::String("09:00:00".to_string())),
            "9:00 AM"
        );
    }

    #[test]
    fn test_time_format_clock_string_afternoon() {
        let formatter = TimeFormatter;
        assert_eq!(
            formatter.format(&Data::String("14:05:00".to_string())),
            "2:05 PM"
        );
    }

    #[test]
    fn test_time_format_clock_string_single_digit_hour() {
        let formatter = TimeFormatter;
        assert_eq!(
            formatter.format(&Data::String("9:00:00".to_string())),
            "9:00 AM"
        );
    }

    #[test]
    fn test_time_format_noon_and_midnight() {
        let formatter = TimeFormatter;
        assert_eq!(
            formatter.format(&Data::String("12:00:00".to_string())),
            "12:00 PM"
        );
        assert_eq!(
            formatter.format(&Data::String("00:00:00".to_string())),
            "12:00 AM"
        );
    }

    #[test]
    fn test_time_format_non_time_string_passes_through() {
        let formatter = TimeFormatter;
        assert_eq!(
            formatter.format(&Data::String("Lunch break".to_string())),
            "Lunch break"
        );
        // HH:MM形式（秒なし）も未整形のまま
        assert_eq!(
            formatter.format(&Data::String("9:00".to_string())),
            "9:00"
        );
    }

    #[test]
    fn test_time_format_from_serial_fraction() {
        // 14:05 = 50700秒 / 86400秒
        let serial = 50_700.0 / 86_400.0;
        assert_eq!(TimeFormatter::from_serial(serial), Some("2:05 PM".to_string()));

        // 日付部付きのシリアル値でも時刻部のみが使われる
        assert_eq!(
            TimeFormatter::from_serial(45_000.0 + serial),
            Some("2:05 PM".to_string())
        );
    }

    #[test]
    fn test_time_format_non_string_cells() {
        let formatter = TimeFormatter;
        assert_eq!(formatter.format(&Data::Int(9)), "9");
        assert_eq!(formatter.format(&Data::Empty), "");
    }

    // datetime_from_serial のテスト
    #[test]
    fn test_datetime_from_serial_known_date() {
        // シリアル値45200 = 2023-10-01
        let (date, time) = datetime_from_serial(45_200.0).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
        assert_eq!(time, NaiveTime::MIN);
    }

    #[test]
    fn test_datetime_from_serial_rejects_invalid() {
        assert!(datetime_from_serial(f64::NAN).is_none());
        assert!(datetime_from_serial(-1.0).is_none());
    }

    // data_to_string のテスト
    #[test]
    fn test_data_to_string_variants() {
        assert_eq!(data_to_string(&Data::Int(42)), "42");
        assert_eq!(data_to_string(&Data::Float(42.5)), "42.5");
        assert_eq!(data_to_string(&Data::Float(500.0)), "500");
        assert_eq!(data_to_string(&Data::String("hello".to_string())), "hello");
        assert_eq!(data_to_string(&Data::Bool(true)), "TRUE");
        assert_eq!(data_to_string(&Data::Empty), "");
    }

    // retain_for_speaker のテスト
    #[test]
    fn test_retain_for_speaker_case_insensitive_substring() {
        assert!(retain_for_speaker("Jane Doe", "jane"));
        assert!(retain_for_speaker("jane", "Jane"));
        assert!(!retain_for_speaker("Bob", "Jane"));
    }

    #[test]
    fn test_retain_for_speaker_all_rows_always_survive() {
        assert!(retain_for_speaker("All", "Jane"));
        assert!(retain_for_speaker("all speakers", "Bob"));
        // "all"を部分文字列として含む値も残る
        assert!(retain_for_speaker("Hall staff", "Jane"));
    }

    #[test]
    fn test_retain_for_speaker_substring_is_lossy() {
        // 部分文字列一致の仕様: "Bob"の選択は"Bobby"にも一致する
        assert!(retain_for_speaker("Bobby", "Bob"));
    }

    #[test]
    fn test_retain_for_speaker_empty_speaker_dropped() {
        assert!(!retain_for_speaker("", "Jane"));
    }

    // lookup のテスト
    #[test]
    fn test_lookup_priority_order() {
        let mut kv = HashMap::new();
        kv.insert("Primary".to_string(), "first".to_string());
        kv.insert("Fallback".to_string(), "second".to_string());

        assert_eq!(lookup(&kv, &["Primary", "Fallback"]), "first");
        assert_eq!(lookup(&kv, &["Missing", "Fallback"]), "second");
        assert_eq!(lookup(&kv, &["Missing", "AlsoMissing"]), "");
    }

    // find_column のテスト
    #[test]
    fn test_find_column_exact_match() {
        let header = vec![
            Data::String("Time".to_string()),
            Data::String("What".to_string()),
            Data::String("Who".to_string()),
        ];

        assert_eq!(find_column(&header, "What"), Some(1));
        assert_eq!(find_column(&header, "Speaker"), None);
        // 大文字小文字を区別する
        assert_eq!(find_column(&header, "time"), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // 時刻としてパースできない文字列は常に無変更で通過すること
            #[test]
            fn test_non_time_strings_pass_through(s in "[a-zA-Z ]{0,24}") {
                let formatter = TimeFormatter;
                let result = formatter.format(&Data::String(s.clone()));
                prop_assert_eq!(result, s);
            }

            // 任意の時刻に対して整形結果が`h:mm AM/PM`の形であること
            #[test]
            fn test_display_shape(hour in 0u32..24, minute in 0u32..60) {
                let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
                let display = TimeFormatter::to_display(time);

                prop_assert!(display.ends_with(" AM") || display.ends_with(" PM"));
                prop_assert!(!display.starts_with('0'));

                let clock = display.trim_end_matches(" AM").trim_end_matches(" PM");
                let (h, m) = clock.split_once(':').unwrap();
                let h: u32 = h.parse().unwrap();
                let m: u32 = m.parse().unwrap();
                prop_assert!((1..=12).contains(&h));
                prop_assert_eq!(m, minute);
            }
        }
    }
}
