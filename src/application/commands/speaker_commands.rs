//! Speaker Commands

/// 注册（克隆）说话人命令
#[derive(Debug, Clone)]
pub struct RegisterSpeaker {
    pub speaker_id: String,
    /// 上传的参考音频原始字节
    pub audio: Vec<u8>,
}

/// 删除说话人命令
#[derive(Debug, Clone)]
pub struct DeleteSpeaker {
    pub speaker_id: String,
}
