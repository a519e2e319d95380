//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//! テンプレートレンダラーに渡すコンテキスト構造を提供します。

use serde::Serialize;

/// イベントメタデータ
///
/// "Event Details"シートから抽出される固定フィールドの集合です。
/// すべてのフィールドが常に存在し、ラベルが見つからなかった場合は
/// 空文字列になります（欠落キーは存在しません）。
///
/// フィールド名はDOCXテンプレート内のプレースホルダ名
/// （例: `{{event_name}}`）と一致します。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventMetadata {
    /// イベント名
    pub event_name: String,

    /// 開催日
    pub dates: String,

    /// 開催時刻
    pub time: String,

    /// 会場名
    pub location_name: String,

    /// 会場住所
    pub location_address: String,

    /// 聴衆の詳細
    pub event_audience_details: String,

    /// 予想参加人数
    pub expected_attendance: String,

    /// ホスト1の氏名
    pub host_name_1: String,

    /// ホスト1の携帯電話番号
    pub cell_phone_1: String,

    /// ホスト2の氏名
    pub host_name_2: String,

    /// ホスト2の携帯電話番号
    pub cell_phone_2: String,

    /// 駐車場の詳細
    pub parking_details: String,

    /// イベントプロデューサーのメールアドレス
    pub event_producer_email: String,

    /// 提出期限
    pub deadline: String,

    /// ステージレイアウト
    pub stage_layout: String,

    /// デザインに関する注記
    pub design: String,
}

impl EventMetadata {
    /// プレースホルダ名と値のペアを取得
    ///
    /// テンプレートレンダラーが`{{name}}`形式のプレースホルダを
    /// 置換する際に使用します。名前はserdeフィールド名と同一です。
    pub fn placeholder_values(&self) -> [(&'static str, &str); 16] {
        [
            ("event_name", self.event_name.as_str()),
            ("dates", self.dates.as_str()),
            ("time", self.time.as_str()),
            ("location_name", self.location_name.as_str()),
            ("location_address", self.location_address.as_str()),
            ("event_audience_details", self.event_audience_details.as_str()),
            ("expected_attendance", self.expected_attendance.as_str()),
            ("host_name_1", self.host_name_1.as_str()),
            ("cell_phone_1", self.cell_phone_1.as_str()),
            ("host_name_2", self.host_name_2.as_str()),
            ("cell_phone_2", self.cell_phone_2.as_str()),
            ("parking_details", self.parking_details.as_str()),
            ("event_producer_email", self.event_producer_email.as_str()),
            ("deadline", self.deadline.as_str()),
            ("stage_layout", self.stage_layout.as_str()),
            ("design", self.design.as_str()),
        ]
    }
}

/// スケジュール行（出力用）
///
/// "Onsite Schedule"シートの1行に対応します。フィルタリングにのみ
/// 使用されるスピーカー情報は含まれません（抽出段階で除去されます）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    /// 時刻（整形済み、または未整形の元値）
    pub time: String,

    /// 内容
    pub what: String,

    /// 担当者
    pub who: String,
}

impl ScheduleRow {
    /// 新しいスケジュール行を生成
    pub fn new(
        time: impl Into<String>,
        what: impl Into<String>,
        who: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            what: what.into(),
            who: who.into(),
        }
    }
}

/// Speaker Packetレンダリング用コンテキスト
///
/// テンプレートレンダラーに渡される正規化済みデータ構造です。
/// イベントメタデータの各フィールドに加えて、選択されたスピーカーで
/// フィルタリング済みのスケジュール行を順序付きで保持します。
///
/// コンテキストはスピーカー選択ごとに毎回再構築され、生成間で
/// 状態を共有しません。
///
/// # シリアライズ形式
///
/// serdeでシリアライズすると、メタデータフィールドがトップレベルに
/// フラット化され、`schedule`がオブジェクトの配列になります。これは
/// テンプレートコラボレーターが期待する「名前付きプレースホルダから
/// 文字列／シーケンスへのマッピング」に対応します。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpeakerPacketContext {
    /// イベントメタデータ（シリアライズ時はトップレベルへ展開）
    #[serde(flatten)]
    pub metadata: EventMetadata,

    /// フィルタリング・整形済みのスケジュール（ソース順を保持）
    pub schedule: Vec<ScheduleRow>,
}
