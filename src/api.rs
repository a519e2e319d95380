//! Public API Types
//!
//! 公開APIで使用する選択型と定数を定義するモジュール。

/// 「全スピーカー」を意味するセンチネルラベル
///
/// スピーカー一覧の先頭に合成されるエントリです。このラベルが選択された
/// 場合、スピーカーによるスケジュールのフィルタリングは行われません。
pub const ALL_SPEAKERS_LABEL: &str = "All Speakers";

/// Speaker Packet生成ファイル名の固定サフィックス
pub(crate) const FILE_NAME_SUFFIX: &str = "_Speaker_Packet.docx";

/// スピーカー選択
///
/// 1回の生成リクエストのスコープで完結する明示的なパラメータです。
/// UI側で保持される選択状態に依存せず、生成呼び出しごとに完全な入力
/// （ファイル＋選択）を受け取ります。
///
/// # 使用例
///
/// ```rust
/// use speakerpacket::{SpeakerSelection, ALL_SPEAKERS_LABEL};
///
/// let all = SpeakerSelection::from_label(ALL_SPEAKERS_LABEL);
/// assert_eq!(all, SpeakerSelection::AllSpeakers);
/// assert_eq!(all.selected_name(), None);
///
/// let jane = SpeakerSelection::from_label("Jane");
/// assert_eq!(jane.selected_name(), Some("Jane"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpeakerSelection {
    /// 全スピーカー（フィルタリングなし）
    AllSpeakers,

    /// 特定のスピーカー名による選択
    ///
    /// スケジュール行は、スピーカー列の値（小文字化）が選択名
    /// （小文字化）を部分文字列として含む場合、または`"all"`を含む
    /// 場合に残ります。
    Name(String),
}

impl SpeakerSelection {
    /// UIのドロップダウンラベルから選択を生成
    ///
    /// `"All Speakers"`（センチネル）は`AllSpeakers`に、それ以外は
    /// `Name`にマッピングされます。
    pub fn from_label(label: &str) -> Self {
        if label == ALL_SPEAKERS_LABEL {
            SpeakerSelection::AllSpeakers
        } else {
            SpeakerSelection::Name(label.to_string())
        }
    }

    /// 選択に対応する表示ラベルを取得
    pub fn label(&self) -> &str {
        match self {
            SpeakerSelection::AllSpeakers => ALL_SPEAKERS_LABEL,
            SpeakerSelection::Name(name) => name.as_str(),
        }
    }

    /// フィルタリング対象のスピーカー名を取得
    ///
    /// # 戻り値
    ///
    /// * `Some(&str)` - 特定のスピーカーが選択されている場合
    /// * `None` - センチネル（フィルタリングなし）の場合
    pub fn selected_name(&self) -> Option<&str> {
        match self {
            SpeakerSelection::AllSpeakers => None,
            SpeakerSelection::Name(name) => Some(name.as_str()),
        }
    }
}

/// Speaker Packetの推奨ファイル名を導出
///
/// スピーカーラベル中の空白をアンダースコアに置換し、固定サフィックス
/// `_Speaker_Packet.docx`を付加します。
///
/// # 使用例
///
/// ```rust
/// use speakerpacket::packet_file_name;
///
/// assert_eq!(packet_file_name("Jane Doe"), "Jane_Doe_Speaker_Packet.docx");
/// assert_eq!(
///     packet_file_name("All Speakers"),
///     "All_Speakers_Speaker_Packet.docx"
/// );
/// ```
pub fn packet_file_name(speaker_label: &str) -> String {
    format!("{}{}", speaker_label.replace(' ', "_"), FILE_NAME_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_sentinel() {
        assert_eq!(
            SpeakerSelection::from_label("All Speakers"),
            SpeakerSelection::AllSpeakers
        );
    }

    #[test]
    fn test_from_label_name() {
        assert_eq!(
            SpeakerSelection::from_label("Jane"),
            SpeakerSelection::Name("Jane".to_string())
        );
        // センチネルは完全一致のみ
        assert_eq!(
            SpeakerSelection::from_label("all speakers"),
            SpeakerSelection::Name("all speakers".to_string())
        );
    }

    #[test]
    fn test_label_round_trip() {
        for label in ["All Speakers", "Jane", "bob"] {
            assert_eq!(SpeakerSelection::from_label(label).label(), label);
        }
    }

    #[test]
    fn test_selected_name() {
        assert_eq!(SpeakerSelection::AllSpeakers.selected_name(), None);
        assert_eq!(
            SpeakerSelection::Name("Jane".to_string()).selected_name(),
            Some("Jane")
        );
    }

    #[test]
    fn test_packet_file_name() {
        assert_eq!(packet_file_name("Jane"), "Jane_Speaker_Packet.docx");
        assert_eq!(
            packet_file_name("Jane Ann Doe"),
            "Jane_Ann_Doe_Speaker_Packet.docx"
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // ファイル名に空白が残らず、サフィックスが常に付くこと
            #[test]
            fn test_packet_file_name_shape(label in "[a-zA-Z ]{0,30}") {
                let name = packet_file_name(&label);
                prop_assert!(!name.contains(' '));
                prop_assert!(name.ends_with("_Speaker_Packet.docx"));
            }
        }
    }
}
