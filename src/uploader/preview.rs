use crate::models::ImageUrl;

/// Zoomed-in view of one session image. Never submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Collapsed,
    Enlarged(ImageUrl),
}

impl PreviewState {
    pub fn open(&mut self, url: ImageUrl) {
        log::debug!("Preview enlarged: {}", url);
        *self = PreviewState::Enlarged(url);
    }

    pub fn dismiss(&mut self) {
        if self.is_enlarged() {
            log::debug!("Preview collapsed");
        }
        *self = PreviewState::Collapsed;
    }

    pub fn is_enlarged(&self) -> bool {
        matches!(self, PreviewState::Enlarged(_))
    }

    pub fn enlarged_url(&self) -> Option<&str> {
        match self {
            PreviewState::Enlarged(url) => Some(url.as_str()),
            PreviewState::Collapsed => None,
        }
    }
}
