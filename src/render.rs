//! Template Renderer Module
//!
//! Speaker Packet（DOCX）のテンプレートレンダリングを提供するモジュール。
//! DOCXファイル（ZIPコンテナ）を展開し、`word/document.xml`内の
//! プレースホルダをコンテキスト値で置換して新しいアーカイブを組み立てます。
//!
//! レンダラーは`TemplateRenderer`トレイトの背後に隠蔽されており、
//! 差し替え可能です。デフォルト実装の`DocxTemplate`は呼び出しごとに
//! テンプレートを読み直し、状態を保持しません。

use std::borrow::Cow;
use std::io::{Cursor, Read, Write};
use std::path::PathBuf;

use quick_xml::escape::escape;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::SpeakerPacketError;
use crate::security::{validate_zip_path, SecurityConfig};
use crate::types::{ScheduleRow, SpeakerPacketContext};

/// Speaker Packet（DOCX）のMIMEタイプ
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// DOCXコンテナ内の本文XMLのパス
const DOCUMENT_MEMBER: &str = "word/document.xml";

/// スケジュール行プレースホルダ（表行の複製判定に使用）
const ROW_PLACEHOLDERS: [&str; 3] = ["{{time}}", "{{what}}", "{{who}}"];

/// テンプレートレンダラー
///
/// 正規化済みコンテキストからSpeaker Packetのバイト列を生成する
/// コラボレーターの境界です。テストではこのトレイトを実装した
/// スタブを注入できます。
pub trait TemplateRenderer {
    /// コンテキストをレンダリングしてDOCXバイト列を生成
    ///
    /// # 引数
    ///
    /// * `context` - 抽出済みのSpeaker Packetコンテキスト
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<u8>)` - 生成されたDOCXファイルのバイト列
    /// * `Err(SpeakerPacketError)` - レンダリングに失敗した場合
    fn render(&self, context: &SpeakerPacketContext) -> Result<Vec<u8>, SpeakerPacketError>;
}

/// 固定テンプレートのDOCXレンダラー
///
/// テンプレートファイルを呼び出しごとに読み直すため、呼び出し間で
/// 状態を共有しません。テンプレートの差し替えはファイルの置き換えだけで
/// 反映されます。
///
/// # 置換規則
///
/// * `{{field_name}}`形式のプレースホルダをメタデータ値（XMLエスケープ済み）
///   で置換します。名前はコンテキストのserdeフィールド名と同一です。
/// * `{{time}}`/`{{what}}`/`{{who}}`の3つすべてを含む`<w:tr>`（表行）は
///   スケジュール行ごとに複製されます。スケジュールが空の場合、その行は
///   出力から除去されます。
/// * `word/document.xml`以外のアーカイブメンバーは無変更でコピーされます。
///
/// プレースホルダはテンプレート内で単一のラン（`<w:t>`要素）に収まって
/// いる必要があります。
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    path: PathBuf,
}

impl DocxTemplate {
    /// テンプレートファイルを指すレンダラーを生成
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// テンプレートバイト列からDOCXを生成
    ///
    /// ファイルI/Oを伴わないレンダリングの本体です。アーカイブの各
    /// メンバーはセキュリティ検証（パス検証・サイズ制限）を通過した
    /// 上で出力へコピーされ、`word/document.xml`のみ置換後の内容に
    /// 差し替えられます。
    pub fn render_bytes(
        template: &[u8],
        context: &SpeakerPacketContext,
    ) -> Result<Vec<u8>, SpeakerPacketError> {
        let security_config = SecurityConfig::default();

        let mut archive = ZipArchive::new(Cursor::new(template))
            .map_err(|e| SpeakerPacketError::Zip(e.to_string()))?;

        if archive.len() > security_config.max_file_count {
            return Err(SpeakerPacketError::SecurityViolation(format!(
                "Too many files in archive: {} (max: {})",
                archive.len(),
                security_config.max_file_count
            )));
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut total_size: u64 = 0;
        let mut document_found = false;

        for i in 0..archive.len() {
            let mut member = archive
                .by_index(i)
                .map_err(|e| SpeakerPacketError::Zip(e.to_string()))?;
            let name = member.name().to_string();

            validate_zip_path(&name).map_err(SpeakerPacketError::SecurityViolation)?;

            if member.size() > security_config.max_member_size {
                return Err(SpeakerPacketError::SecurityViolation(format!(
                    "File too large in archive: {} ({} bytes, max: {} bytes)",
                    name,
                    member.size(),
                    security_config.max_member_size
                )));
            }

            total_size += member.size();
            if total_size > security_config.max_decompressed_size {
                return Err(SpeakerPacketError::SecurityViolation(format!(
                    "Decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_size, security_config.max_decompressed_size
                )));
            }

            let mut contents = Vec::new();
            member.read_to_end(&mut contents)?;

            let output = if name == DOCUMENT_MEMBER {
                document_found = true;
                let xml = std::str::from_utf8(&contents)?;
                render_document_xml(xml, context).into_bytes()
            } else {
                contents
            };

            writer
                .start_file(name, FileOptions::default())
                .map_err(|e| SpeakerPacketError::Zip(e.to_string()))?;
            writer.write_all(&output)?;
        }

        if !document_found {
            return Err(SpeakerPacketError::Render(format!(
                "template is missing {}",
                DOCUMENT_MEMBER
            )));
        }

        let cursor = writer
            .finish()
            .map_err(|e| SpeakerPacketError::Zip(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

impl TemplateRenderer for DocxTemplate {
    fn render(&self, context: &SpeakerPacketContext) -> Result<Vec<u8>, SpeakerPacketError> {
        let template = std::fs::read(&self.path)?;

        let security_config = SecurityConfig::default();
        if template.len() as u64 > security_config.max_input_file_size {
            return Err(SpeakerPacketError::SecurityViolation(format!(
                "Template file size exceeds maximum: {} bytes (max: {} bytes)",
                template.len(),
                security_config.max_input_file_size
            )));
        }

        Self::render_bytes(&template, context)
    }
}

/// 本文XMLのレンダリング
///
/// スケジュール行の展開を先に行い、残ったプレースホルダをメタデータで
/// 置換します。この順序により、展開行の外側に現れる`{{time}}`は
/// イベント開催時刻（メタデータ）として解決されます。
fn render_document_xml(xml: &str, context: &SpeakerPacketContext) -> String {
    let mut result = expand_schedule_rows(xml, &context.schedule);

    for (name, value) in context.metadata.placeholder_values() {
        let placeholder = format!("{{{{{}}}}}", name);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &escape_xml(value));
        }
    }

    result
}

/// スケジュール行の展開
///
/// `{{time}}`/`{{what}}`/`{{who}}`の3つすべてを含む`<w:tr>`ブロックを
/// スケジュール行ごとに複製し、各複製内のプレースホルダを行の値で
/// 置換します。それ以外の表行は無変更で通過します。入れ子の表は
/// 想定していません。
fn expand_schedule_rows(xml: &str, schedule: &[ScheduleRow]) -> String {
    const ROW_OPEN: &str = "<w:tr";
    const ROW_CLOSE: &str = "</w:tr>";

    let mut result = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(start) = rest.find(ROW_OPEN) {
        let close_rel = match rest[start..].find(ROW_CLOSE) {
            Some(pos) => pos,
            None => break,
        };
        let end = start + close_rel + ROW_CLOSE.len();
        let block = &rest[start..end];

        result.push_str(&rest[..start]);

        if is_schedule_row(block) {
            for row in schedule {
                result.push_str(&render_row_block(block, row));
            }
        } else {
            result.push_str(block);
        }

        rest = &rest[end..];
    }

    result.push_str(rest);
    result
}

/// スケジュール行テンプレートの判定
fn is_schedule_row(block: &str) -> bool {
    ROW_PLACEHOLDERS
        .iter()
        .all(|placeholder| block.contains(placeholder))
}

/// 1スケジュール行分のブロックを生成
fn render_row_block(block: &str, row: &ScheduleRow) -> String {
    block
        .replace("{{time}}", &escape_xml(&row.time))
        .replace("{{what}}", &escape_xml(&row.what))
        .replace("{{who}}", &escape_xml(&row.who))
}

/// 置換値のXMLエスケープ
///
/// セル値に`&`や`<`が含まれていても本文XMLの構造を壊さないよう、
/// 置換前にエスケープします。
fn escape_xml(value: &str) -> Cow<'_, str> {
    escape(value)
}
