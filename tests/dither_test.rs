// test of monochromization and raster operations
use mackit::img::{dither,Raster,Rect,Fill};
use mackit::img::dither::DitherStrategy;

fn gray_raster(levels: &[u8], width: usize, height: usize) -> Raster {
    let mut data = Vec::new();
    for g in levels {
        data.extend_from_slice(&[*g,*g,*g,255]);
    }
    Raster::from_data(width,height,data).expect("bad fixture")
}

#[test]
fn rec709_grayscale() {
    let mut data = Vec::new();
    for px in [[255,0,0,255],[0,255,0,255],[0,0,255,255],[255,255,255,255],[0,0,0,0]] {
        data.extend_from_slice(&px);
    }
    let raster = Raster::from_data(5,1,data).expect("bad fixture");
    // alpha is ignored, so the transparent black pixel is still 0
    assert_eq!(dither::grayscale(&raster),vec![54,182,18,255,0]);
}

#[test]
fn threshold_cutoff() {
    let raster = gray_raster(&[0,50,100,127,128,200,255,130],8,1);
    let gray = dither::grayscale(&raster);
    let bits = dither::Threshold::default().dither(&gray,8,1).expect("could not dither");
    assert_eq!(bits,vec![0xf0]);
    let bits = dither::Threshold { value: 60 }.dither(&gray,8,1).expect("could not dither");
    assert_eq!(bits,vec![0xc0]);
}

#[test]
fn floyd_steinberg_diffusion() {
    // one row of mid gray alternates once the error propagates
    let gray = vec![128u8;8];
    let strategy = dither::FloydSteinberg;
    let bits = strategy.dither(&gray,8,1).expect("could not dither");
    assert_eq!(bits,vec![0x55]);
    // the caller's buffer is untouched
    assert_eq!(gray,vec![128u8;8]);
    // extremes are stable
    assert_eq!(strategy.dither(&vec![255u8;16],8,2).expect("could not dither"),vec![0x00,0x00]);
    assert_eq!(strategy.dither(&vec![0u8;16],8,2).expect("could not dither"),vec![0xff,0xff]);
}

#[test]
fn atkinson_diffusion() {
    let gray = vec![128u8;8];
    let strategy = dither::Atkinson;
    let bits = strategy.dither(&gray,8,1).expect("could not dither");
    assert_eq!(bits,vec![0x66]);
    assert_eq!(gray,vec![128u8;8]);
    // Atkinson only propagates 3/4 of the error, so solid black stays solid
    assert_eq!(strategy.dither(&vec![0u8;32],8,4).expect("could not dither"),vec![0xff;4]);
}

#[test]
fn bayer_ordered() {
    let gray = vec![128u8;16];
    let bits = dither::Bayer::new(2).dither(&gray,8,2).expect("could not dither");
    assert_eq!(bits,vec![0x00,0xaa]);
    // stateless: a second run is identical
    let again = dither::Bayer::new(2).dither(&gray,8,2).expect("could not dither");
    assert_eq!(bits,again);
    // an unsupported order falls back to 4x4
    let fell_back = dither::Bayer::new(5).dither(&gray,8,2).expect("could not dither");
    let four = dither::Bayer::new(4).dither(&gray,8,2).expect("could not dither");
    assert_eq!(fell_back,four);
    assert_eq!(dither::Bayer::default().dither(&gray,8,2).expect("could not dither"),four);
}

#[test]
fn dimension_checks() {
    let gray = vec![128u8;12];
    // width not a multiple of 8
    assert!(dither::Threshold::default().dither(&gray,12,1).is_err());
    // buffer does not match the dimensions
    assert!(dither::Threshold::default().dither(&gray,8,2).is_err());
}

#[test]
fn crop_bounds() {
    let raster = Raster::new(10,10,Fill::White);
    let cropped = raster.crop(&Rect { x: 2, y: 3, width: 4, height: 5 }).expect("could not crop");
    assert_eq!(cropped.width,4);
    assert_eq!(cropped.height,5);
    assert!(raster.crop(&Rect { x: 8, y: 0, width: 4, height: 4 }).is_err());
    assert!(raster.crop(&Rect { x: 0, y: 0, width: 0, height: 4 }).is_err());
}

#[test]
fn pad_placement_and_clipping() {
    let mut small = Raster::new(2,2,Fill::Black);
    small.set_pixel(1,1,[10,20,30,255]);
    let padded = small.pad(4,4,1,1,Fill::White);
    assert_eq!(padded.pixel(0,0),[255,255,255,255]);
    assert_eq!(padded.pixel(1,1),[0,0,0,255]);
    assert_eq!(padded.pixel(2,2),[10,20,30,255]);
    // negative offsets clip silently
    let clipped = small.pad(4,4,-1,-1,Fill::White);
    assert_eq!(clipped.pixel(0,0),[10,20,30,255]);
    assert_eq!(clipped.pixel(3,3),[255,255,255,255]);
}

#[test]
fn bilinear_scale() {
    let raster = Raster::new(3,3,Fill::Black);
    // same dimensions is a no-op
    assert_eq!(raster.scale(3,3),raster);
    // constant images stay constant at any size
    let up = raster.scale(9,6);
    assert_eq!(up.width,9);
    assert_eq!(up.height,6);
    for y in 0..6 {
        for x in 0..9 {
            assert_eq!(up.pixel(x,y),[0,0,0,255]);
        }
    }
    // interpolation between two pixels
    let mut two = Raster::new(2,1,Fill::Black);
    two.set_pixel(0,0,[0,0,0,255]);
    two.set_pixel(1,0,[200,100,50,255]);
    let four = two.scale(4,1);
    assert_eq!(four.pixel(0,0),[0,0,0,255]);
    assert_eq!(four.pixel(1,0),[100,50,25,255]);
    assert_eq!(four.pixel(2,0),[200,100,50,255]);
    assert_eq!(four.pixel(3,0),[200,100,50,255]);
}

#[test]
fn raster_buffer_validation() {
    assert!(Raster::from_data(2,2,vec![0;16]).is_ok());
    assert!(Raster::from_data(2,2,vec![0;15]).is_err());
}
