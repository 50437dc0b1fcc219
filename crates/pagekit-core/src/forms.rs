//! Submit acknowledgement for static-site forms.
//!
//! Submissions are never sent anywhere and never validated: every submit is
//! acknowledged through the overlay and the form is reset. Field constraints
//! (`required` and friends) are the markup's business.

use std::rc::Rc;

use crate::config::FormSpec;
use crate::host::{EventKind, Host};
use crate::overlay::OverlayController;

/// Intercepts submits on one form.
pub struct FormInterceptor<H: Host> {
    form: H::Node,
    form_id: String,
}

impl<H: Host> std::fmt::Debug for FormInterceptor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormInterceptor")
            .field("form_id", &self.form_id)
            .finish()
    }
}

impl<H: Host> FormInterceptor<H> {
    /// Wire `form`: prevent submission, acknowledge with `title`/`message`,
    /// reset the fields.
    pub fn attach(
        host: &Rc<H>,
        overlay: &Rc<OverlayController<H>>,
        form: H::Node,
        title: &str,
        message: &str,
    ) -> Self {
        let form_id = host.attribute(&form, "id").unwrap_or_default();
        let overlay = Rc::downgrade(overlay);
        let listener_host = Rc::clone(host);
        let target = form.clone();
        let title = title.to_owned();
        let message = message.to_owned();
        host.listen(
            &form,
            EventKind::Submit,
            Box::new(move |event| {
                event.prevent_default();
                if let Some(overlay) = overlay.upgrade() {
                    overlay.notify(&title, &message);
                }
                listener_host.reset_form(&target);
            }),
        );
        Self { form, form_id }
    }

    /// Look up `spec.form_id` and wire it. `None` when the page has no such
    /// form.
    pub fn attach_spec(
        host: &Rc<H>,
        overlay: &Rc<OverlayController<H>>,
        spec: &FormSpec,
    ) -> Option<Self> {
        let form = host.element_by_id(&spec.form_id)?;
        let interceptor = Self::attach(host, overlay, form, &spec.title, &spec.message);
        crate::debug!(form = %spec.form_id, "form interceptor attached");
        Some(interceptor)
    }

    #[must_use]
    pub fn form(&self) -> &H::Node {
        &self.form
    }

    #[must_use]
    pub fn form_id(&self) -> &str {
        &self.form_id
    }
}
