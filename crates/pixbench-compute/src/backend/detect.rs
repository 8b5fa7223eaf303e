//! Backend detection.

use super::BackendKind;

/// Information about a pixel backend.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Backend type.
    pub kind: BackendKind,
    /// Results-log label.
    pub name: &'static str,
    /// Whether this build and machine can run it.
    pub available: bool,
    /// Description.
    pub description: &'static str,
}

/// Detect all backends this build knows about.
pub fn detect_backends() -> Vec<BackendInfo> {
    BackendKind::ALL
        .into_iter()
        .map(|kind| BackendInfo {
            kind,
            name: kind.label(),
            available: kind.is_available(),
            description: match kind {
                BackendKind::Scalar => "sequential reference loops",
                BackendKind::Device if cfg!(feature = "wgpu") => "GPU compute kernel via wgpu (Vulkan/Metal/DX12)",
                BackendKind::Device => "GPU compute kernel (built without the wgpu feature)",
                BackendKind::Library if cfg!(feature = "opencv") => "OpenCV imgproc",
                BackendKind::Library => "OpenCV imgproc (built without the opencv feature)",
            },
        })
        .collect()
}

/// Get description of available backends.
pub fn describe_backends() -> String {
    let mut desc = String::new();

    for info in detect_backends() {
        let status = if info.available { "+" } else { "-" };
        desc.push_str(&format!("[{}] {}: {}\n", status, info.name, info.description));
    }

    desc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_always_listed() {
        let backends = detect_backends();
        assert_eq!(backends.len(), 3);
        assert!(backends.iter().any(|b| b.kind == BackendKind::Scalar && b.available));
        assert!(describe_backends().contains("[+] CPU"));
    }
}
