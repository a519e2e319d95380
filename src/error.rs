//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// speakerpacketクレート全体で使用するエラー型
///
/// Onsite Packet（XLSX）の読み込み・抽出、およびSpeaker Packet（DOCX）の
/// レンダリング処理中に発生するすべてのエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み失敗など）
/// - `Parse`: Excelファイルの解析中に発生したエラー（calamine由来）
/// - `MalformedInput`: 必須シート・必須列が欠落または読み取り不能なエラー
/// - `Render`: テンプレートレンダリング中に発生したエラー
/// - `Config`: 設定の検証に失敗したエラー（テンプレート未指定など）
///
/// 個々のメタデータフィールドの欠落や、時刻値のパース失敗はエラーに
/// なりません。該当フィールド・該当行のみが空文字列／未整形値に縮退し、
/// 抽出処理は継続します。
///
/// # 使用例
///
/// ```rust,no_run
/// use speakerpacket::SpeakerPacketError;
/// use std::fs::File;
///
/// fn open_packet(path: &str) -> Result<File, SpeakerPacketError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum SpeakerPacketError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// calamineクレートがワークブックを解析する際に発生したエラーです。
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    ///
    /// DOCXテンプレート内のXMLをUTF-8文字列へ変換できなかった場合に
    /// 発生します。
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    ///
    /// XLSX・DOCXファイル（ZIPアーカイブ）の解析中に発生したエラーです。
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 必須シート・必須列が欠落しているエラー
    ///
    /// Onsite Packetの構造が想定と異なる場合（"Event Details"シートや
    /// "Onsite Schedule"シートの欠落、`Time`/`What`/`Who`列の欠落）に
    /// 発生します。この場合のみ抽出処理全体が中断されます。
    ///
    /// # 例
    ///
    /// ```rust
    /// use speakerpacket::SpeakerPacketError;
    ///
    /// let error = SpeakerPacketError::MalformedInput {
    ///     sheet: "Onsite Schedule".to_string(),
    ///     message: "required column 'Time' not found".to_string(),
    /// };
    ///
    /// assert!(error.to_string().contains("Onsite Schedule"));
    /// ```
    #[error("Malformed input in sheet '{sheet}': {message}")]
    MalformedInput {
        /// エラーが発生したシート名
        sheet: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// テンプレートレンダリング中に発生したエラー
    ///
    /// DOCXテンプレートが不正（`word/document.xml`の欠落など）な場合や、
    /// 出力アーカイブの書き込みに失敗した場合に発生します。
    #[error("Template render error: {0}")]
    Render(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `PacketGeneratorBuilder::build()`時に設定を検証し、無効な設定が
    /// 検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}
