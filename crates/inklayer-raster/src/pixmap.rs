//! A plain RGBA8 pixel buffer with the two blend rules the canvas needs.

/// An owned RGBA8 raster, row-major, initialized fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Source-over blend of one pixel. Out-of-bounds writes are dropped.
    pub fn blend_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        let sa = rgba[3] as u32;
        if sa == 0 {
            return;
        }
        if sa == 255 {
            self.data[i..i + 4].copy_from_slice(&rgba);
            return;
        }
        let inv = 255 - sa;
        for c in 0..3 {
            let src = rgba[c] as u32;
            let dst = self.data[i + c] as u32;
            self.data[i + c] = ((src * sa + dst * inv + 127) / 255) as u8;
        }
        let da = self.data[i + 3] as u32;
        self.data[i + 3] = (sa + (da * inv + 127) / 255) as u8;
    }

    /// Destination-out: clear a pixel to fully transparent.
    pub fn erase_pixel(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.data[i..i + 4].fill(0);
    }
}
