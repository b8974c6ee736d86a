// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resources: named asset loading and the per-window shader, texture and font caches.
//!
//! Textures loaded from resources or memory are ready immediately. Textures loaded from a
//! URL are handed out empty and filled in by [`Application::ensure_textures`] (run at the
//! start of every [`Application::render_window`]) once the download arrives. The window
//! holds such textures weakly: dropping every handle abandons the download.

use core::any::{Any, TypeId};
use core::fmt;
use core::task::Poll;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use bough_cache::{Cache, Payload, Pending, Policy};
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::{Application, ViewId, WindowId};

/// Source of named resources, such as images and font metadata bundled with the app.
pub trait ResourceManager {
    /// The bytes of resource `name`, or `None` if there is no such resource.
    fn load(&self, name: &str) -> Option<Payload>;
}

/// Resources read from files under a root directory.
#[derive(Clone, Debug)]
pub struct FileResourceManager {
    root: PathBuf,
}

impl FileResourceManager {
    /// Resolve resource names relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceManager for FileResourceManager {
    fn load(&self, name: &str) -> Option<Payload> {
        let path = self.root.join(name);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes.into()),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "resource not readable");
                None
            }
        }
    }
}

/// Where a texture's bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureSource {
    /// A named resource.
    Resource(String),
    /// Bytes supplied by the caller.
    Memory,
    /// A download.
    Url(String),
}

/// Encoded image bytes shared between views, possibly still downloading.
pub struct Texture {
    source: TextureSource,
    data: RwLock<Option<Payload>>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("source", &self.source)
            .field("bytes", &self.byte_len())
            .finish()
    }
}

impl Texture {
    fn loaded(source: TextureSource, data: Payload) -> Self {
        Self {
            source,
            data: RwLock::new(Some(data)),
        }
    }

    fn pending(source: TextureSource) -> Self {
        Self {
            source,
            data: RwLock::new(None),
        }
    }

    /// Where the texture came from.
    pub fn source(&self) -> &TextureSource {
        &self.source
    }

    /// Returns true once the texture's bytes are available.
    pub fn is_loaded(&self) -> bool {
        self.data.read().is_some()
    }

    /// The texture's bytes, if loaded.
    pub fn data(&self) -> Option<Payload> {
        self.data.read().clone()
    }

    /// Size of the loaded bytes; zero while pending.
    pub fn byte_len(&self) -> usize {
        self.data.read().as_ref().map_or(0, |d| d.len())
    }

    fn set_data(&self, data: Payload) {
        *self.data.write() = Some(data);
    }
}

/// A bitmap font: a glyph atlas texture plus its metadata.
#[derive(Debug)]
pub struct BitmapFont {
    texture: Arc<Texture>,
    metadata: Payload,
}

impl BitmapFont {
    /// The glyph atlas.
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    /// Raw glyph metadata.
    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }
}

/// A texture download owned by a window.
pub(crate) struct TextureDownload {
    url: String,
    texture: Weak<Texture>,
    pending: Pending,
    complete: bool,
    /// Views to invalidate when the texture arrives.
    views: SmallVec<[ViewId; 2]>,
}

/// Per-window resource caches.
#[derive(Debug, Default)]
pub struct WindowCaches {
    shaders: Cache<dyn Any + Send + Sync>,
    textures: Cache<Texture>,
    fonts: Cache<BitmapFont>,
}

impl WindowCaches {
    /// Shaders and other GPU programs, keyed by type and identifier.
    pub fn shaders(&self) -> &Cache<dyn Any + Send + Sync> {
        &self.shaders
    }

    /// Textures loaded from resources and memory.
    pub fn textures(&self) -> &Cache<Texture> {
        &self.textures
    }

    /// Bitmap fonts.
    pub fn fonts(&self) -> &Cache<BitmapFont> {
        &self.fonts
    }

    pub(crate) fn sweep(&self) {
        let swept = self.shaders.sweep() + self.textures.sweep() + self.fonts.sweep();
        tracing::debug!(swept, "swept window caches");
    }
}

impl Application {
    /// The bytes of resource `name` from the resource manager.
    pub fn load_resource(&self, name: &str) -> Option<Payload> {
        let Some(resources) = self.resources.as_deref() else {
            tracing::warn!(name, "no resource manager installed");
            return None;
        };
        let bytes = resources.load(name);
        if bytes.is_none() {
            tracing::warn!(name, "resource not found");
        }
        bytes
    }

    /// Load resource `name` as a texture of `window`.
    pub fn load_texture_resource(&self, window: WindowId, name: &str) -> Option<Arc<Texture>> {
        let caches = &self.windows.get(window)?.caches;
        let key = format!("resource:{name}");
        if let Some(hit) = caches.textures.get(&key) {
            return Some(hit);
        }
        let bytes = self.load_resource(name)?;
        Some(caches.textures.add(
            Texture::loaded(TextureSource::Resource(name.into()), bytes),
            &key,
            Policy::RemoveUnreferenced,
        ))
    }

    /// Wrap `bytes` as a texture of `window`; identical bytes share one texture.
    pub fn load_texture_from_memory(&self, window: WindowId, bytes: Payload) -> Option<Arc<Texture>> {
        let caches = &self.windows.get(window)?.caches;
        let key = ("memory", &bytes[..]);
        if let Some(hit) = caches.textures.get(&key) {
            return Some(hit);
        }
        Some(caches.textures.add(
            Texture::loaded(TextureSource::Memory, Arc::clone(&bytes)),
            &key,
            Policy::RemoveUnreferenced,
        ))
    }

    /// Start loading `url` as a texture of `window`.
    ///
    /// The texture is empty until the download completes and
    /// [`Application::ensure_textures`] runs. Requests for a URL whose texture is still
    /// alive share it.
    pub fn load_texture_from_url(&mut self, window: WindowId, url: &str) -> Option<Arc<Texture>> {
        let w = self.windows.get_mut(window)?;
        if let Some(texture) = w
            .texture_downloads
            .iter()
            .find(|d| d.url == url)
            .and_then(|d| d.texture.upgrade())
        {
            return Some(texture);
        }
        w.texture_downloads.retain(|d| d.url != url);

        let texture = Arc::new(Texture::pending(TextureSource::Url(url.into())));
        let pending = self.downloads.download(url);
        if let Some(w) = self.windows.get_mut(window) {
            w.texture_downloads.push(TextureDownload {
                url: url.into(),
                texture: Arc::downgrade(&texture),
                pending,
                complete: false,
                views: SmallVec::new(),
            });
        }
        tracing::debug!(?window, url, "texture download started");
        Some(texture)
    }

    /// Load a bitmap font from a texture resource and a metadata resource.
    pub fn load_bitmap_font_resource(
        &self,
        window: WindowId,
        texture_name: &str,
        metadata_name: &str,
    ) -> Option<Arc<BitmapFont>> {
        let key = ("resource", texture_name, metadata_name);
        if let Some(hit) = self.windows.get(window)?.caches.fonts.get(&key) {
            return Some(hit);
        }
        let texture = self.load_texture_resource(window, texture_name)?;
        let metadata = self.load_resource(metadata_name)?;
        let fonts = &self.windows.get(window)?.caches.fonts;
        Some(fonts.add(BitmapFont { texture, metadata }, &key, Policy::RemoveUnreferenced))
    }

    /// The shader of type `S` named `identifier` in `window`, created by `make` on first
    /// use and kept for the window's lifetime.
    pub fn shader<S: Any + Send + Sync>(
        &self,
        window: WindowId,
        identifier: &str,
        make: impl FnOnce() -> S,
    ) -> Option<Arc<S>> {
        let shaders = &self.windows.get(window)?.caches.shaders;
        let key = (TypeId::of::<S>(), identifier);
        let shader = shaders.add_with(&key, Policy::KeepForever, || {
            let shader: Arc<dyn Any + Send + Sync> = Arc::new(make());
            shader
        });
        shader.downcast::<S>().ok()
    }

    /// Load resource `name` as a texture for `view`, invalidating its render cache.
    pub fn load_view_texture_resource(&mut self, view: ViewId, name: &str) -> Option<Arc<Texture>> {
        let window = self.window_of(view)?;
        let texture = self.load_texture_resource(window, name)?;
        self.invalidate_render_cache(view);
        Some(texture)
    }

    /// Wrap `bytes` as a texture for `view`, invalidating its render cache.
    pub fn load_view_texture_from_memory(
        &mut self,
        view: ViewId,
        bytes: Payload,
    ) -> Option<Arc<Texture>> {
        let window = self.window_of(view)?;
        let texture = self.load_texture_from_memory(window, bytes)?;
        self.invalidate_render_cache(view);
        Some(texture)
    }

    /// Start loading `url` as a texture for `view`; the view's render cache is invalidated
    /// when the texture arrives.
    pub fn load_view_texture_from_url(&mut self, view: ViewId, url: &str) -> Option<Arc<Texture>> {
        let window = self.window_of(view)?;
        let texture = self.load_texture_from_url(window, url)?;
        if texture.is_loaded() {
            self.invalidate_render_cache(view);
        } else if let Some(download) = self
            .windows
            .get_mut(window)
            .and_then(|w| w.texture_downloads.iter_mut().find(|d| d.url == url))
            && !download.views.contains(&view)
        {
            download.views.push(view);
        }
        Some(texture)
    }

    /// Fill in textures whose downloads finished and forget abandoned ones.
    pub fn ensure_textures(&mut self, window: WindowId) {
        let Some(w) = self.windows.get_mut(window) else {
            return;
        };
        let mut invalidate: SmallVec<[ViewId; 8]> = SmallVec::new();
        w.texture_downloads.retain_mut(|download| {
            let Some(texture) = download.texture.upgrade() else {
                tracing::trace!(url = %download.url, "texture dropped before it loaded");
                return false;
            };
            if download.complete {
                return true;
            }
            match download.pending.poll() {
                Poll::Pending => {}
                Poll::Ready(Some(bytes)) => {
                    texture.set_data(bytes);
                    invalidate.extend(download.views.drain(..));
                    download.complete = true;
                }
                Poll::Ready(None) => {
                    tracing::warn!(url = %download.url, "texture download failed");
                    download.views.clear();
                    download.complete = true;
                }
            }
            true
        });
        for view in invalidate {
            self.invalidate_render_cache(view);
        }
    }
}

#[cfg(test)]
mod tests {
    use hashbrown::HashMap;

    use bough_cache::{DownloadCache, DownloadConfig, Fetch, FetchError, InlineSpawner};

    use super::*;
    use crate::WindowConfig;

    #[derive(Default)]
    struct MapResources(HashMap<&'static str, &'static [u8]>);

    impl ResourceManager for MapResources {
        fn load(&self, name: &str) -> Option<Payload> {
            self.0.get(name).map(|b| Payload::from(*b))
        }
    }

    fn app_with_resources() -> (Application, WindowId) {
        let mut map = MapResources::default();
        map.0.insert("atlas.png", b"png bytes");
        map.0.insert("atlas.fnt", b"glyphs");
        let mut app = Application::default().with_resource_manager(map);
        let w = app.create_window(WindowConfig::default());
        (app, w)
    }

    #[test]
    fn resource_textures_are_shared_while_held() {
        let (app, w) = app_with_resources();
        let a = app.load_texture_resource(w, "atlas.png").expect("resource exists");
        let b = app.load_texture_resource(w, "atlas.png").expect("resource exists");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_loaded());
        assert_eq!(a.source(), &TextureSource::Resource("atlas.png".into()));
        assert!(app.load_texture_resource(w, "missing.png").is_none());
    }

    #[test]
    fn memory_textures_are_keyed_by_content() {
        let (app, w) = app_with_resources();
        let a = app
            .load_texture_from_memory(w, Payload::from(&b"abc"[..]))
            .expect("live window");
        let b = app
            .load_texture_from_memory(w, Payload::from(&b"abc"[..]))
            .expect("live window");
        let c = app
            .load_texture_from_memory(w, Payload::from(&b"xyz"[..]))
            .expect("live window");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn fonts_reuse_their_texture() {
        let (app, w) = app_with_resources();
        let font = app
            .load_bitmap_font_resource(w, "atlas.png", "atlas.fnt")
            .expect("both resources exist");
        assert_eq!(font.metadata(), b"glyphs");
        let texture = app.load_texture_resource(w, "atlas.png").expect("cached");
        assert!(Arc::ptr_eq(font.texture(), &texture));
        assert!(app.load_bitmap_font_resource(w, "atlas.png", "nope.fnt").is_none());
    }

    #[test]
    fn shaders_are_created_once_per_type_and_name() {
        #[derive(Debug, PartialEq)]
        struct Solid(u32);
        #[derive(Debug, PartialEq)]
        struct Blur(u32);

        let (mut app, w) = app_with_resources();
        let a = app.shader(w, "main", || Solid(1)).expect("live window");
        let b = app.shader(w, "main", || Solid(2)).expect("live window");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, Solid(1));
        let blur = app.shader(w, "main", || Blur(3)).expect("live window");
        assert_eq!(*blur, Blur(3));

        drop((a, b, blur));
        app.low_memory();
        assert!(app.shader(w, "main", || Solid(4)).is_some_and(|s| *s == Solid(1)));
    }

    struct Echo;

    impl Fetch for Echo {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            if url.ends_with(".missing") {
                return Err(FetchError::Status(404));
            }
            Ok(url.as_bytes().to_vec())
        }
    }

    fn app_with_downloads() -> (Application, WindowId, ViewId) {
        let downloads =
            DownloadCache::with_spawner(Arc::new(Echo), InlineSpawner, DownloadConfig::default());
        let mut app = Application::default().with_download_cache(downloads);
        let w = app.create_window(WindowConfig::default());
        app.open_window(w).expect("headless open");
        let content = app.content_view(w).expect("content");
        let v = app.create_plain_view();
        app.add_subview(content, v);
        (app, w, v)
    }

    #[test]
    fn url_textures_fill_in_on_ensure() {
        let (mut app, w, v) = app_with_downloads();
        app.set_caches_render(v, true);
        let texture = app
            .load_view_texture_from_url(v, "https://example.com/a.png")
            .expect("attached view");
        assert!(!texture.is_loaded(), "data arrives on the next ensure");
        let again = app
            .load_texture_from_url(w, "https://example.com/a.png")
            .expect("live window");
        assert!(Arc::ptr_eq(&texture, &again));

        app.ensure_textures(w);
        assert_eq!(texture.data().as_deref(), Some(&b"https://example.com/a.png"[..]));
        assert_eq!(app.downloads().transfers_started(), 1);
    }

    #[test]
    fn dropped_url_textures_are_forgotten() {
        let (mut app, w, _) = app_with_downloads();
        let texture = app
            .load_texture_from_url(w, "https://example.com/b.png")
            .expect("live window");
        drop(texture);
        app.ensure_textures(w);
        assert!(app.window(w).is_some_and(|w| w.texture_downloads.is_empty()));

        let failed = app
            .load_texture_from_url(w, "https://example.com/c.missing")
            .expect("live window");
        app.ensure_textures(w);
        assert!(!failed.is_loaded());
    }

    #[test]
    fn file_resources_resolve_under_root() {
        let dir = std::env::temp_dir().join(format!("bough-resources-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir is writable");
        std::fs::write(dir.join("hello.txt"), b"hi").expect("temp dir is writable");
        let resources = FileResourceManager::new(&dir);
        assert_eq!(resources.load("hello.txt").as_deref(), Some(&b"hi"[..]));
        assert!(resources.load("absent.txt").is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
