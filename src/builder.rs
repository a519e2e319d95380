//! Builder Module
//!
//! Speaker Packet生成の公開エントリーポイントを提供するモジュール。
//! ビルダーパターンで設定を組み立て、ファサードの`PacketGenerator`から
//! スピーカー一覧の取得・コンテキスト抽出・パケット生成を行います。
//!
//! # 使用例
//!
//! ```rust,no_run
//! use speakerpacket::{PacketGeneratorBuilder, SpeakerSelection};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = PacketGeneratorBuilder::new()
//!     .with_template_path("speaker_template.docx")
//!     .build()?;
//!
//! let packet = generator.generate_packet(
//!     File::open("onsite_packet.xlsx")?,
//!     &SpeakerSelection::Name("Jane".to_string()),
//! )?;
//!
//! assert_eq!(packet.file_name, "Jane_Speaker_Packet.docx");
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Seek};
use std::path::PathBuf;

use crate::api::{packet_file_name, SpeakerSelection, ALL_SPEAKERS_LABEL};
use crate::error::SpeakerPacketError;
use crate::extractor::ContextExtractor;
use crate::render::{DocxTemplate, TemplateRenderer, DOCX_CONTENT_TYPE};
use crate::types::SpeakerPacketContext;

/// "Event Details"シートのデフォルト名
const DEFAULT_EVENT_DETAILS_SHEET: &str = "Event Details";

/// "Onsite Schedule"シートのデフォルト名
const DEFAULT_SCHEDULE_SHEET: &str = "Onsite Schedule";

/// 生成設定
///
/// 抽出対象のシート名を保持します。シート名は組織のワークブック
/// テンプレート改訂に追従できるよう設定可能です。
#[derive(Debug, Clone)]
pub(crate) struct GeneratorConfig {
    /// key-valueシート（イベントメタデータ）の名前
    pub event_details_sheet: String,
    /// スケジュールシートの名前
    pub schedule_sheet: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            event_details_sheet: DEFAULT_EVENT_DETAILS_SHEET.to_string(),
            schedule_sheet: DEFAULT_SCHEDULE_SHEET.to_string(),
        }
    }
}

/// 生成されたSpeaker Packet
///
/// ダウンロード・保存に必要な情報一式（推奨ファイル名とバイト列）を
/// 保持します。
#[derive(Debug, Clone)]
pub struct SpeakerPacket {
    /// 推奨ファイル名（`<ラベル>_Speaker_Packet.docx`、空白は`_`に置換）
    pub file_name: String,

    /// DOCXファイルのバイト列
    pub bytes: Vec<u8>,
}

impl SpeakerPacket {
    /// ダウンロード応答に使用するMIMEタイプを取得
    pub fn content_type(&self) -> &'static str {
        DOCX_CONTENT_TYPE
    }
}

/// PacketGeneratorのビルダー
///
/// テンプレートの指定（パスまたはレンダラーの注入）と、シート名の
/// 上書きを受け付けます。`build()`で設定を検証し、不正な設定は
/// `Config`エラーになります。
///
/// # 使用例
///
/// ```rust
/// use speakerpacket::PacketGeneratorBuilder;
///
/// let generator = PacketGeneratorBuilder::new()
///     .with_template_path("template.docx")
///     .with_event_details_sheet("Event Details")
///     .with_schedule_sheet("Onsite Schedule")
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct PacketGeneratorBuilder {
    config: GeneratorConfig,
    template_path: Option<PathBuf>,
    renderer: Option<Box<dyn TemplateRenderer>>,
}

impl PacketGeneratorBuilder {
    /// 新しいビルダーを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// DOCXテンプレートファイルのパスを設定
    ///
    /// デフォルトのレンダラー（`DocxTemplate`）がこのパスを呼び出し
    /// ごとに読み直します。`with_renderer`でレンダラーを注入した場合、
    /// この設定は使用されません。
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// イベントメタデータシートの名前を設定
    pub fn with_event_details_sheet(mut self, name: impl Into<String>) -> Self {
        self.config.event_details_sheet = name.into();
        self
    }

    /// スケジュールシートの名前を設定
    pub fn with_schedule_sheet(mut self, name: impl Into<String>) -> Self {
        self.config.schedule_sheet = name.into();
        self
    }

    /// テンプレートレンダラーを注入
    ///
    /// DOCX以外の出力形式やテストスタブへの差し替えに使用します。
    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// 設定を検証してPacketGeneratorを構築
    ///
    /// # 戻り値
    ///
    /// * `Ok(PacketGenerator)` - 設定が有効な場合
    /// * `Err(SpeakerPacketError::Config)` - シート名が空、または
    ///   テンプレートもレンダラーも指定されていない場合
    pub fn build(self) -> Result<PacketGenerator, SpeakerPacketError> {
        if self.config.event_details_sheet.is_empty() {
            return Err(SpeakerPacketError::Config(
                "event details sheet name must not be empty".to_string(),
            ));
        }
        if self.config.schedule_sheet.is_empty() {
            return Err(SpeakerPacketError::Config(
                "schedule sheet name must not be empty".to_string(),
            ));
        }

        let renderer: Box<dyn TemplateRenderer> = match (self.renderer, self.template_path) {
            (Some(renderer), _) => renderer,
            (None, Some(path)) => Box::new(DocxTemplate::new(path)),
            (None, None) => {
                return Err(SpeakerPacketError::Config(
                    "a template path or a renderer is required".to_string(),
                ))
            }
        };

        Ok(PacketGenerator {
            config: self.config,
            renderer,
        })
    }
}

/// Speaker Packetジェネレーター
///
/// 生成リクエストごとに完全な入力（ワークブック＋スピーカー選択）を
/// 受け取り、コンテキストを毎回再構築します。呼び出し間で状態を共有
/// しないため、1つのジェネレーターを複数のワークブックに対して
/// 繰り返し使用できます。失敗した呼び出しは後続の呼び出しに影響
/// しません。
pub struct PacketGenerator {
    config: GeneratorConfig,
    renderer: Box<dyn TemplateRenderer>,
}

impl PacketGenerator {
    /// スピーカー一覧を取得
    ///
    /// スケジュールシートの`Speaker`列から重複排除・辞書順の名前一覧を
    /// 作り、先頭にセンチネル（`"All Speakers"`）を付加して返します。
    /// `Speaker`列がない場合は`["All Speakers", "All"]`になります。
    ///
    /// # 引数
    ///
    /// * `input` - Onsite Packet（XLSX）を読み込むリーダー
    pub fn list_speakers<R: Read + Seek>(
        &self,
        input: R,
    ) -> Result<Vec<String>, SpeakerPacketError> {
        let extractor = ContextExtractor::new(&self.config);
        let names = extractor.speaker_names(input)?;

        let mut speakers = Vec::with_capacity(names.len() + 1);
        speakers.push(ALL_SPEAKERS_LABEL.to_string());
        speakers.extend(names);
        Ok(speakers)
    }

    /// コンテキストを抽出
    ///
    /// レンダリングを伴わない抽出のみのエントリーポイントです。
    /// 抽出結果の確認やレンダラーの単体検証に使用できます。
    pub fn extract_context<R: Read + Seek>(
        &self,
        input: R,
        selection: &SpeakerSelection,
    ) -> Result<SpeakerPacketContext, SpeakerPacketError> {
        let extractor = ContextExtractor::new(&self.config);
        extractor.extract(input, selection)
    }

    /// Speaker Packetを生成
    ///
    /// コンテキストの抽出とテンプレートレンダリングを実行し、推奨
    /// ファイル名付きの成果物を返します。いずれかの段階で失敗した
    /// 場合は単一の型付きエラーを返し、部分的な成果物は生成しません。
    ///
    /// # 引数
    ///
    /// * `input` - Onsite Packet(XLSX)を読み込むリーダー
    /// * `selection` - スピーカー選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(SpeakerPacket)` - 生成されたパケット
    /// * `Err(SpeakerPacketError)` - 抽出またはレンダリングに失敗した場合
    pub fn generate_packet<R: Read + Seek>(
        &self,
        input: R,
        selection: &SpeakerSelection,
    ) -> Result<SpeakerPacket, SpeakerPacketError> {
        let context = self.extract_context(input, selection)?;
        let bytes = self.renderer.render(&context)?;

        Ok(SpeakerPacket {
            file_name: packet_file_name(selection.label()),
            bytes,
        })
    }
}
